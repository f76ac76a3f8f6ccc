use std::fmt;

use crate::store::StoreError;

/// Input rejected before any store call is made
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("habit name must not be empty")]
    EmptyName,
    #[error("category must not be empty")]
    EmptyCategory,
    #[error("category already exists: {0}")]
    DuplicateCategory(String),
    #[error("nothing to edit")]
    NoChanges,
}

/// The store call a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    List,
    Create,
    Toggle,
    Edit,
    Delete,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StoreOp::List => "load habits",
            StoreOp::Create => "add habit",
            StoreOp::Toggle => "update completion",
            StoreOp::Edit => "update habit",
            StoreOp::Delete => "delete habit",
        };
        f.write_str(s)
    }
}

/// Error type for habit engine operations
#[derive(Debug, thiserror::Error)]
pub enum HabitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("habit not found: {0}")]
    NotFound(String),
    #[error("failed to {op}{}: {source}", habit_suffix(.id))]
    Store {
        op: StoreOp,
        id: Option<String>,
        source: StoreError,
    },
    #[error(
        "order saved for some habits but not for {}; run `hab refresh` to resync with the store",
        join_ids(.failed)
    )]
    Consistency { failed: Vec<(String, StoreError)> },
}

fn habit_suffix(id: &Option<String>) -> String {
    id.as_ref()
        .map(|i| format!(" for habit {}", i))
        .unwrap_or_default()
}

fn join_ids(failed: &[(String, StoreError)]) -> String {
    failed
        .iter()
        .map(|(id, _)| id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl HabitError {
    pub fn store(op: StoreOp, id: Option<&str>, source: StoreError) -> Self {
        HabitError::Store {
            op,
            id: id.map(|s| s.to_string()),
            source,
        }
    }

    /// Ids whose stored state is known to differ from local state
    pub fn inconsistent_ids(&self) -> Vec<&str> {
        match self {
            HabitError::Consistency { failed } => failed.iter().map(|(id, _)| id.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_message_names_op_and_habit() {
        let err = HabitError::store(
            StoreOp::Toggle,
            Some("3"),
            StoreError::Transport("connection refused".into()),
        );
        assert_eq!(
            err.to_string(),
            "failed to update completion for habit 3: request failed: connection refused"
        );
    }

    #[test]
    fn consistency_message_lists_failed_ids() {
        let err = HabitError::Consistency {
            failed: vec![
                ("2".into(), StoreError::NotFound("2".into())),
                ("5".into(), StoreError::Transport("timeout".into())),
            ],
        };
        assert!(err.to_string().contains("not for 2, 5"));
        assert_eq!(err.inconsistent_ids(), vec!["2", "5"]);
    }
}
