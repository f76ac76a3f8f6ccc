use indexmap::IndexMap;

use crate::error::ValidationError;
use crate::model::habit::Habit;
use crate::ops::book::clean_category;

/// Validate a new category against the known list. Returns the normalised name.
pub fn validate_new_category(known: &[String], name: &str) -> Result<String, ValidationError> {
    let name = clean_category(name)?;
    if known.iter().any(|c| c.eq_ignore_ascii_case(&name)) {
        return Err(ValidationError::DuplicateCategory(name));
    }
    Ok(name)
}

/// Icon hint for a category; unknown categories get a generic tag.
pub fn category_icon(category: &str) -> &'static str {
    match category {
        "health" => "heartbeat",
        "productivity" => "check-circle",
        "learning" => "book",
        "social" => "users",
        "other" => "ellipsis",
        _ => "tag",
    }
}

/// Habit count per category: configured categories first in their configured
/// order, then categories only habits use, in first-seen order.
pub fn category_counts(known: &[String], habits: &[Habit]) -> IndexMap<String, usize> {
    let mut counts: IndexMap<String, usize> = known.iter().map(|c| (c.clone(), 0)).collect();
    for habit in habits {
        *counts.entry(habit.category.clone()).or_insert(0) += 1;
    }
    counts
}

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
