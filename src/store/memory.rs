use std::collections::HashSet;

use crate::model::habit::{Habit, HabitInput, HabitPatch};
use crate::store::{HabitStore, StoreError};

/// Which store call a failure is injected into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailOn {
    List,
    Create,
    Replace,
    Patch,
    Delete,
}

/// In-process habit store with failure injection.
///
/// Ids are assigned from a counter starting at 1 and are never reused, even
/// after a delete.
#[derive(Debug, Default)]
pub struct MemoryStore {
    habits: Vec<Habit>,
    next_id: u64,
    fail_ops: HashSet<FailOn>,
    fail_ids: HashSet<(FailOn, String)>,
    calls: Vec<(FailOn, Option<String>)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            next_id: 1,
            ..Default::default()
        }
    }

    /// Start from an existing collection. The id counter continues after the
    /// highest numeric id present.
    pub fn with_habits(habits: Vec<Habit>) -> Self {
        let max = habits
            .iter()
            .filter_map(|h| h.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        MemoryStore {
            habits,
            next_id: max + 1,
            ..Default::default()
        }
    }

    /// Fail every call of the given kind.
    pub fn fail(&mut self, op: FailOn) {
        self.fail_ops.insert(op);
    }

    /// Fail calls of the given kind that target `id`.
    pub fn fail_for(&mut self, op: FailOn, id: &str) {
        self.fail_ids.insert((op, id.to_string()));
    }

    pub fn heal(&mut self) {
        self.fail_ops.clear();
        self.fail_ids.clear();
    }

    /// The store's own view of the collection
    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn get(&self, id: &str) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> &[(FailOn, Option<String>)] {
        &self.calls
    }

    pub fn count_calls(&self, op: FailOn) -> usize {
        self.calls.iter().filter(|(o, _)| *o == op).count()
    }

    fn check(&mut self, op: FailOn, id: Option<&str>) -> Result<(), StoreError> {
        self.calls.push((op, id.map(|s| s.to_string())));
        let targeted = id.is_some_and(|id| self.fail_ids.contains(&(op, id.to_string())));
        if self.fail_ops.contains(&op) || targeted {
            return Err(StoreError::Status {
                status: 503,
                message: format!("injected {:?} failure", op),
            });
        }
        Ok(())
    }

    fn position(&self, id: &str) -> Result<usize, StoreError> {
        self.habits
            .iter()
            .position(|h| h.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

impl HabitStore for MemoryStore {
    fn list(&mut self) -> Result<Vec<Habit>, StoreError> {
        self.check(FailOn::List, None)?;
        Ok(self.habits.clone())
    }

    fn create(&mut self, input: &HabitInput) -> Result<Habit, StoreError> {
        self.check(FailOn::Create, None)?;
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        let habit = Habit::from_input(id.to_string(), input.clone());
        self.habits.push(habit.clone());
        Ok(habit)
    }

    fn replace(&mut self, id: &str, habit: &Habit) -> Result<Habit, StoreError> {
        self.check(FailOn::Replace, Some(id))?;
        let idx = self.position(id)?;
        let mut stored = habit.clone();
        stored.id = id.to_string();
        self.habits[idx] = stored.clone();
        Ok(stored)
    }

    fn patch(&mut self, id: &str, patch: &HabitPatch) -> Result<Habit, StoreError> {
        self.check(FailOn::Patch, Some(id))?;
        let idx = self.position(id)?;
        self.habits[idx].apply_patch(patch);
        Ok(self.habits[idx].clone())
    }

    fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        self.check(FailOn::Delete, Some(id))?;
        let idx = self.position(id)?;
        self.habits.remove(idx);
        Ok(())
    }
}
