use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tracked habit as held by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    /// Store-assigned identifier, never reused
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Completion flag for the current cycle
    #[serde(default)]
    pub completed: bool,
    /// Consecutive-day completion count
    #[serde(default)]
    pub streak: u32,
    /// Set only when the habit transitions into completed
    #[serde(default)]
    pub last_completed: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Manual display order, lower sorts first
    #[serde(default)]
    pub order: u32,
}

impl Habit {
    /// Build the canonical record from a create payload and its assigned id.
    pub fn from_input(id: String, input: HabitInput) -> Self {
        Habit {
            id,
            name: input.name,
            category: input.category,
            goal: input.goal,
            notes: input.notes,
            completed: input.completed,
            streak: input.streak,
            last_completed: input.last_completed,
            created_at: input.created_at,
            order: input.order,
        }
    }

    /// Apply every field present in `patch`. The id is never touched.
    pub fn apply_patch(&mut self, patch: &HabitPatch) {
        if let Some(ref name) = patch.name {
            self.name = name.clone();
        }
        if let Some(ref category) = patch.category {
            self.category = category.clone();
        }
        if let Some(ref goal) = patch.goal {
            self.goal = Some(goal.clone());
        }
        if let Some(ref notes) = patch.notes {
            self.notes = Some(notes.clone());
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(streak) = patch.streak {
            self.streak = streak;
        }
        if let Some(last) = patch.last_completed {
            self.last_completed = Some(last);
        }
        if let Some(order) = patch.order {
            self.order = order;
        }
    }
}

/// Create payload: everything but the id, which the store assigns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitInput {
    pub name: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub last_completed: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub order: u32,
}

/// Partial update. Absent fields are left alone by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streak: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_completed: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

impl HabitPatch {
    /// A patch that only moves a habit in the manual order
    pub fn order(order: u32) -> Self {
        HabitPatch {
            order: Some(order),
            ..Default::default()
        }
    }
}

/// What the user supplies when adding a habit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewHabit {
    pub name: String,
    pub category: String,
    pub goal: Option<String>,
    pub notes: Option<String>,
}

/// Edited fields. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitEdit {
    pub name: Option<String>,
    pub category: Option<String>,
    pub goal: Option<String>,
    pub notes: Option<String>,
}

impl HabitEdit {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.category.is_none() && self.goal.is_none() && self.notes.is_none()
    }
}

/// The single mutation entry point's input: add a new habit or edit an existing one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HabitIntent {
    Create(NewHabit),
    Edit { id: String, edit: HabitEdit },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Habit {
        Habit {
            id: "7".into(),
            name: "Read 30 minutes".into(),
            category: "learning".into(),
            goal: None,
            notes: None,
            completed: false,
            streak: 3,
            last_completed: None,
            created_at: Utc.with_ymd_and_hms(2025, 5, 1, 8, 0, 0).unwrap(),
            order: 2,
        }
    }

    #[test]
    fn wire_format_is_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("lastCompleted").is_some());
        assert!(json.get("goal").is_none());
    }

    #[test]
    fn missing_counters_default_to_zero() {
        let habit: Habit = serde_json::from_str(
            r#"{"id":"1","name":"Drink water","category":"health","createdAt":"2025-05-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(habit.streak, 0);
        assert_eq!(habit.order, 0);
        assert!(!habit.completed);
        assert!(habit.last_completed.is_none());
    }

    #[test]
    fn order_patch_serializes_only_order() {
        let json = serde_json::to_string(&HabitPatch::order(4)).unwrap();
        assert_eq!(json, r#"{"order":4}"#);
    }

    #[test]
    fn apply_patch_keeps_unpatched_fields() {
        let mut habit = sample();
        habit.apply_patch(&HabitPatch {
            name: Some("Read 1 hour".into()),
            ..Default::default()
        });
        assert_eq!(habit.name, "Read 1 hour");
        assert_eq!(habit.streak, 3);
        assert_eq!(habit.order, 2);
        assert_eq!(habit.id, "7");
    }
}
