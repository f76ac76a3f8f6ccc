use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::model::habit::Habit;

/// Completion status filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    /// Not completed yet
    Active,
    Completed,
}

impl StatusFilter {
    pub fn matches(self, habit: &Habit) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !habit.completed,
            StatusFilter::Completed => habit.completed,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "active" => Ok(StatusFilter::Active),
            "completed" | "done" => Ok(StatusFilter::Completed),
            other => Err(format!(
                "invalid status filter: {} (expected all, active, completed)",
                other
            )),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Completed => "completed",
        })
    }
}

/// Category filter: everything, or one exact category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn matches(&self, habit: &Habit) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => habit.category == *category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("category filter must not be empty".to_string());
        }
        if s.eq_ignore_ascii_case("all") {
            Ok(CategoryFilter::All)
        } else {
            Ok(CategoryFilter::Only(s.to_lowercase()))
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("all"),
            CategoryFilter::Only(c) => f.write_str(c),
        }
    }
}

/// Project the collection into the visible list: status filter, then category
/// filter, in manual order. Ties on `order` keep collection position.
pub fn filter_habits<'a>(
    habits: &'a [Habit],
    status: StatusFilter,
    category: &CategoryFilter,
) -> Vec<&'a Habit> {
    let mut visible: Vec<&Habit> = habits
        .iter()
        .filter(|h| status.matches(h))
        .filter(|h| category.matches(h))
        .collect();
    visible.sort_by_key(|h| h.order);
    visible
}
