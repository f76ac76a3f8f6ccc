use chrono::{DateTime, Datelike, Days, NaiveTime, TimeZone};

use crate::model::config::ReminderConfig;

/// Error type for reminder settings
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReminderError {
    #[error("invalid reminder time: {0} (expected HH:MM)")]
    InvalidTime(String),
    #[error("invalid reminder day: {0} (expected 0-6, 0 = Sunday)")]
    InvalidDay(u8),
}

/// When daily reminders fire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderSchedule {
    pub time: NaiveTime,
    /// Weekday flags indexed from Sunday
    days: [bool; 7],
}

impl ReminderSchedule {
    pub fn from_config(config: &ReminderConfig) -> Result<Self, ReminderError> {
        let time = NaiveTime::parse_from_str(config.time.trim(), "%H:%M")
            .map_err(|_| ReminderError::InvalidTime(config.time.clone()))?;
        let mut days = [false; 7];
        for &day in &config.days {
            let slot = days
                .get_mut(day as usize)
                .ok_or(ReminderError::InvalidDay(day))?;
            *slot = true;
        }
        Ok(ReminderSchedule { time, days })
    }

    pub fn is_enabled(&self) -> bool {
        self.days.iter().any(|d| *d)
    }

    pub fn fires_on(&self, weekday: chrono::Weekday) -> bool {
        self.days[weekday.num_days_from_sunday() as usize]
    }

    /// Next reminder strictly after `now`, in `now`'s time zone. `None` when no
    /// day is selected.
    pub fn next_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let tz = now.timezone();
        let today = now.date_naive();
        (0..=7u64)
            .filter_map(|offset| today.checked_add_days(Days::new(offset)))
            .filter(|date| self.fires_on(date.weekday()))
            .filter_map(|date| tz.from_local_datetime(&date.and_time(self.time)).earliest())
            .find(|at| at > now)
    }

    /// Day names in Sunday-first order, for display
    pub fn day_names(&self) -> Vec<&'static str> {
        const NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
        NAMES
            .iter()
            .zip(self.days.iter())
            .filter(|(_, on)| **on)
            .map(|(name, _)| *name)
            .collect()
    }
}
