use chrono::{Datelike, NaiveDate, TimeZone};
use serde::Serialize;

use crate::model::habit::Habit;

/// A calendar month, held as its first day so it is always a valid date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "MonthJson")]
pub struct Month {
    first: NaiveDate,
}

#[derive(Serialize)]
struct MonthJson {
    year: i32,
    month: u32,
}

impl From<Month> for MonthJson {
    fn from(m: Month) -> Self {
        MonthJson {
            year: m.year(),
            month: m.month(),
        }
    }
}

impl Month {
    pub fn new(year: i32, month: u32) -> Option<Month> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Month { first })
    }

    pub fn containing(date: NaiveDate) -> Month {
        Month {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    /// Parse `YYYY-MM`
    pub fn parse(s: &str) -> Result<Month, String> {
        let invalid = || format!("invalid month: {} (expected YYYY-MM)", s);
        let (y, m) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u32 = m.parse().map_err(|_| invalid())?;
        Month::new(year, month).ok_or_else(invalid)
    }

    pub fn year(self) -> i32 {
        self.first.year()
    }

    pub fn month(self) -> u32 {
        self.first.month()
    }

    pub fn first_day(self) -> NaiveDate {
        self.first
    }

    /// Shift by `delta` months, either direction. `None` when the result is
    /// outside the supported date range.
    pub fn offset(self, delta: i32) -> Option<Month> {
        let index = self.year() as i64 * 12 + (self.month() as i64 - 1) + delta as i64;
        let year = i32::try_from(index.div_euclid(12)).ok()?;
        Month::new(year, index.rem_euclid(12) as u32 + 1)
    }

    pub fn days(self) -> u32 {
        self.first
            .iter_days()
            .take_while(|d| d.month() == self.first.month())
            .count() as u32
    }

    pub fn label(self) -> String {
        self.first.format("%B %Y").to_string()
    }
}

/// One day cell of the month grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    /// Ids of habits created on this day, in manual order
    pub habits: Vec<String>,
}

/// Month grid with Sunday as the first column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarMonth {
    pub month: Month,
    /// Blank cells before the 1st
    pub leading_blanks: u32,
    pub days: Vec<CalendarDay>,
}

/// Lay out `month` and place each habit on the day it was created, as seen
/// in time zone `tz`.
pub fn build_month<Tz: TimeZone>(month: Month, habits: &[Habit], tz: &Tz) -> CalendarMonth {
    let first = month.first_day();
    let mut sorted: Vec<&Habit> = habits.iter().collect();
    sorted.sort_by_key(|h| h.order);

    let days = (0..month.days())
        .filter_map(|offset| first.checked_add_days(chrono::Days::new(offset as u64)))
        .map(|date| CalendarDay {
            date,
            habits: sorted
                .iter()
                .filter(|h| h.created_at.with_timezone(tz).date_naive() == date)
                .map(|h| h.id.clone())
                .collect(),
        })
        .collect();

    CalendarMonth {
        month,
        leading_blanks: first.weekday().num_days_from_sunday(),
        days,
    }
}
