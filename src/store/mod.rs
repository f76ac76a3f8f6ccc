//! Habit store collaborators.
//!
//! The store is the source of truth for the habit collection. Every call
//! either resolves with the canonical record or fails with a [`StoreError`];
//! there are no partial results.

pub mod file;
pub mod http;
pub mod memory;

use std::path::PathBuf;

use crate::model::habit::{Habit, HabitInput, HabitPatch};

pub use file::FileStore;
pub use http::HttpStore;
pub use memory::MemoryStore;

/// CRUD over the habit collection, keyed by habit id
pub trait HabitStore {
    /// Fetch all habits.
    fn list(&mut self) -> Result<Vec<Habit>, StoreError>;
    /// Create a habit. The store assigns the id and echoes the full record.
    fn create(&mut self, input: &HabitInput) -> Result<Habit, StoreError>;
    /// Full update of an existing habit.
    fn replace(&mut self, id: &str, habit: &Habit) -> Result<Habit, StoreError>;
    /// Partial update, used for order changes.
    fn patch(&mut self, id: &str, patch: &HabitPatch) -> Result<Habit, StoreError>;
    fn delete(&mut self, id: &str) -> Result<(), StoreError>;
}

/// Error type for store calls
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store is misconfigured: {0}")]
    Config(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("store answered {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed payload: {0}")]
    Malformed(String),
    #[error("habit not found in store: {0}")]
    NotFound(String),
    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not lock the habit store at {path}: another process may be writing")]
    Locked { path: PathBuf },
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Malformed(e.to_string())
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            StoreError::Malformed(e.to_string())
        } else {
            StoreError::Transport(e.to_string())
        }
    }
}

impl<S: HabitStore + ?Sized> HabitStore for Box<S> {
    fn list(&mut self) -> Result<Vec<Habit>, StoreError> {
        (**self).list()
    }

    fn create(&mut self, input: &HabitInput) -> Result<Habit, StoreError> {
        (**self).create(input)
    }

    fn replace(&mut self, id: &str, habit: &Habit) -> Result<Habit, StoreError> {
        (**self).replace(id, habit)
    }

    fn patch(&mut self, id: &str, patch: &HabitPatch) -> Result<Habit, StoreError> {
        (**self).patch(id, patch)
    }

    fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        (**self).delete(id)
    }
}
