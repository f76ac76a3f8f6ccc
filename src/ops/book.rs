//! The in-memory habit collection and the mutations that keep it in step with
//! the store.
//!
//! Every mutation computes the next state locally, sends it to the store, and
//! only writes the collection once the store call has succeeded. A failed call
//! leaves the collection exactly as it was, so callers can revert any
//! optimistic marker they showed.

use chrono::{DateTime, TimeZone, Utc};

use crate::error::{HabitError, StoreOp, ValidationError};
use crate::model::habit::{Habit, HabitEdit, HabitInput, HabitIntent, HabitPatch, NewHabit};
use crate::ops::order::{self, OrderAssignment};
use crate::ops::streak::{self, StreakChange};
use crate::store::{HabitStore, StoreError};

/// Kind of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Presentation hooks the engine calls into
pub trait Presenter {
    /// Ask the user to confirm a destructive action.
    fn confirm(&self, message: &str) -> bool;
    fn notify(&self, message: &str, kind: NoticeKind);
}

/// Send a failed outcome to the presenter as an error notice. The result is
/// handed back unchanged.
pub fn notify_failure<T, E: std::fmt::Display>(
    presenter: &dyn Presenter,
    result: Result<T, E>,
) -> Result<T, E> {
    if let Err(ref e) = result {
        presenter.notify(&e.to_string(), NoticeKind::Error);
    }
    result
}

/// Result of a completion toggle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toggled {
    pub habit: Habit,
    pub change: StreakChange,
}

impl Toggled {
    /// Human-readable summary of the toggle
    pub fn message(&self) -> String {
        let h = &self.habit;
        match self.change {
            StreakChange::Paused => format!("{} marked as not done.", h.name),
            StreakChange::Unchanged => {
                format!("{} already counted today; streak stays at {} {}.", h.name, h.streak, days(h.streak))
            }
            StreakChange::Reset => format!("{} streak restarted at 1 day.", h.name),
            StreakChange::Started | StreakChange::Extended => {
                format!("Great job! {} streak is now {} {}.", h.name, h.streak, days(h.streak))
            }
        }
    }
}

fn days(n: u32) -> &'static str {
    if n == 1 { "day" } else { "days" }
}

/// Result of a delete request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deleted {
    Removed(Habit),
    /// The user declined the confirmation; nothing was sent to the store
    Cancelled,
}

/// Outcome of a successful reorder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reordered {
    pub plan: Vec<OrderAssignment>,
    /// How many order values were sent to the store
    pub persisted: usize,
}

/// Encapsulated habit collection.
///
/// The collection is only reachable through the operations below, which keep
/// it sorted by `order`.
#[derive(Debug, Default)]
pub struct HabitBook {
    habits: Vec<Habit>,
}

impl HabitBook {
    pub fn new() -> Self {
        HabitBook::default()
    }

    /// Build a book from the store's current collection.
    pub fn load(store: &mut dyn HabitStore) -> Result<Self, HabitError> {
        let mut book = HabitBook::new();
        book.refresh(store)?;
        Ok(book)
    }

    /// Replace local state with a full fetch from the store. This is the
    /// remedy after a reorder left the two out of step.
    pub fn refresh(&mut self, store: &mut dyn HabitStore) -> Result<(), HabitError> {
        let mut habits = store
            .list()
            .map_err(|e| HabitError::store(StoreOp::List, None, e))?;
        order::sort_by_order(&mut habits);
        log::debug!("[BOOK] refreshed {} habits", habits.len());
        self.habits = habits;
        Ok(())
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn len(&self) -> usize {
        self.habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }

    /// Current display sequence of ids
    pub fn sequence(&self) -> Vec<String> {
        self.habits.iter().map(|h| h.id.clone()).collect()
    }

    fn index_of(&self, id: &str) -> Result<usize, HabitError> {
        self.habits
            .iter()
            .position(|h| h.id == id)
            .ok_or_else(|| HabitError::NotFound(id.to_string()))
    }

    /// Add a habit. It goes to the end of the manual order; the store assigns
    /// its id.
    pub fn create<Tz: TimeZone>(
        &mut self,
        store: &mut dyn HabitStore,
        new: NewHabit,
        now: &DateTime<Tz>,
    ) -> Result<Habit, HabitError> {
        let name = clean_name(&new.name)?;
        let category = clean_category(&new.category)?;
        let provisional = HabitInput {
            name,
            category,
            goal: non_empty(new.goal),
            notes: non_empty(new.notes),
            completed: false,
            streak: 0,
            last_completed: None,
            created_at: now.with_timezone(&Utc),
            order: self.next_order(),
        };

        let created = store.create(&provisional).map_err(|e| {
            log::warn!("[BOOK] create failed, discarding provisional habit: {}", e);
            HabitError::store(StoreOp::Create, None, e)
        })?;
        log::info!("[BOOK] created habit {} ({})", created.id, created.name);
        self.habits.push(created.clone());
        order::sort_by_order(&mut self.habits);
        Ok(created)
    }

    fn next_order(&self) -> u32 {
        self.habits.len() as u32
    }

    /// Flip completion for `id`, applying the streak rules at `now`.
    pub fn toggle<Tz: TimeZone>(
        &mut self,
        store: &mut dyn HabitStore,
        id: &str,
        now: &DateTime<Tz>,
    ) -> Result<Toggled, HabitError> {
        let idx = self.index_of(id)?;
        let (next, change) = streak::toggle_completion(&self.habits[idx], now);
        let stored = store.replace(id, &next).map_err(|e| {
            log::warn!("[BOOK] toggle of {} rejected by store, keeping previous state", id);
            HabitError::store(StoreOp::Toggle, Some(id), e)
        })?;
        self.habits[idx] = stored.clone();
        log::debug!("[BOOK] toggled {}: {:?} (streak {})", id, change, stored.streak);
        Ok(Toggled {
            habit: stored,
            change,
        })
    }

    /// Merge edited fields into `id`. Completion, streak and order are kept.
    pub fn edit(
        &mut self,
        store: &mut dyn HabitStore,
        id: &str,
        edit: HabitEdit,
    ) -> Result<Habit, HabitError> {
        if edit.is_empty() {
            return Err(ValidationError::NoChanges.into());
        }
        let idx = self.index_of(id)?;
        let mut next = self.habits[idx].clone();
        if let Some(ref name) = edit.name {
            next.name = clean_name(name)?;
        }
        if let Some(ref category) = edit.category {
            next.category = clean_category(category)?;
        }
        if let Some(goal) = edit.goal {
            next.goal = non_empty(Some(goal));
        }
        if let Some(notes) = edit.notes {
            next.notes = non_empty(Some(notes));
        }

        let stored = store
            .replace(id, &next)
            .map_err(|e| HabitError::store(StoreOp::Edit, Some(id), e))?;
        self.habits[idx] = stored.clone();
        log::info!("[BOOK] updated habit {}", id);
        Ok(stored)
    }

    /// Delete `id` after the presenter confirms.
    pub fn delete(
        &mut self,
        store: &mut dyn HabitStore,
        id: &str,
        presenter: &dyn Presenter,
    ) -> Result<Deleted, HabitError> {
        let idx = self.index_of(id)?;
        let message = format!(
            "Are you sure you want to delete \"{}\"?",
            self.habits[idx].name
        );
        if !presenter.confirm(&message) {
            return Ok(Deleted::Cancelled);
        }
        store
            .delete(id)
            .map_err(|e| HabitError::store(StoreOp::Delete, Some(id), e))?;
        let removed = self.habits.remove(idx);
        log::info!("[BOOK] deleted habit {}", id);
        Ok(Deleted::Removed(removed))
    }

    /// Single entry point for the add/edit form.
    pub fn submit<Tz: TimeZone>(
        &mut self,
        store: &mut dyn HabitStore,
        intent: HabitIntent,
        now: &DateTime<Tz>,
    ) -> Result<Habit, HabitError> {
        match intent {
            HabitIntent::Create(new) => self.create(store, new, now),
            HabitIntent::Edit { id, edit } => self.edit(store, &id, edit),
        }
    }

    /// Apply a user-observed id sequence as the new manual order and persist
    /// every changed order value.
    ///
    /// The patches are independent calls. Failed ones are re-sent up to
    /// `retries` times; if some still fail the local order is kept and
    /// `HabitError::Consistency` names the habits whose stored order differs.
    pub fn reorder(
        &mut self,
        store: &mut dyn HabitStore,
        sequence: &[String],
        retries: u32,
    ) -> Result<Reordered, HabitError> {
        let plan = order::plan_order(&self.habits, sequence);
        let mut pending: Vec<&OrderAssignment> = plan.iter().filter(|a| a.changed()).collect();
        let persisted = pending.len();
        order::apply_order(&mut self.habits, &plan);

        let mut failed: Vec<(String, StoreError)> = Vec::new();
        for attempt in 0..=retries {
            failed.clear();
            let mut still_pending = Vec::new();
            for assignment in pending {
                match store.patch(&assignment.id, &HabitPatch::order(assignment.order)) {
                    Ok(_) => {}
                    Err(e) => {
                        log::warn!(
                            "[BOOK] order patch for {} failed (attempt {}): {}",
                            assignment.id,
                            attempt + 1,
                            e
                        );
                        failed.push((assignment.id.clone(), e));
                        still_pending.push(assignment);
                    }
                }
            }
            pending = still_pending;
            if pending.is_empty() {
                break;
            }
        }

        if !failed.is_empty() {
            return Err(HabitError::Consistency { failed });
        }
        log::debug!("[BOOK] reordered {} habits, {} patched", plan.len(), persisted);
        Ok(Reordered { plan, persisted })
    }

    /// Move one habit to `index` in the display order.
    pub fn move_habit(
        &mut self,
        store: &mut dyn HabitStore,
        id: &str,
        index: usize,
        retries: u32,
    ) -> Result<Reordered, HabitError> {
        self.index_of(id)?;
        let sequence = order::move_to(&self.sequence(), id, index);
        self.reorder(store, &sequence, retries)
    }
}

fn clean_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(name.to_string())
}

/// Categories are compared case-insensitively, so they are stored lowercase.
pub fn clean_category(category: &str) -> Result<String, ValidationError> {
    let category = category.trim();
    if category.is_empty() {
        return Err(ValidationError::EmptyCategory);
    }
    Ok(category.to_lowercase())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::{FailOn, MemoryStore};
    use chrono::Duration;
    use std::cell::RefCell;

    struct Scripted {
        answer: bool,
        asked: RefCell<Vec<String>>,
        notices: RefCell<Vec<(String, NoticeKind)>>,
    }

    impl Scripted {
        fn answering(answer: bool) -> Self {
            Scripted {
                answer,
                asked: RefCell::new(Vec::new()),
                notices: RefCell::new(Vec::new()),
            }
        }
    }

    impl Presenter for Scripted {
        fn confirm(&self, message: &str) -> bool {
            self.asked.borrow_mut().push(message.to_string());
            self.answer
        }

        fn notify(&self, message: &str, kind: NoticeKind) {
            self.notices.borrow_mut().push((message.to_string(), kind));
        }
    }

    #[test]
    fn store_failure_reaches_presenter_as_error() {
        let (mut book, mut store) = seeded();
        store.fail(FailOn::Replace);
        let presenter = Scripted::answering(true);

        let result = notify_failure(&presenter, book.toggle(&mut store, "1", &now()));

        assert!(result.is_err());
        let notices = presenter.notices.borrow();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].1, NoticeKind::Error);
        assert!(notices[0].0.contains("failed to update completion for habit 1"));
    }

    #[test]
    fn success_sends_no_error_notice() {
        let (mut book, mut store) = seeded();
        let presenter = Scripted::answering(true);
        notify_failure(&presenter, book.toggle(&mut store, "1", &now())).unwrap();
        assert!(presenter.notices.borrow().is_empty());
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 9, 0, 0).unwrap()
    }

    fn new_habit(name: &str, category: &str) -> NewHabit {
        NewHabit {
            name: name.into(),
            category: category.into(),
            ..Default::default()
        }
    }

    fn seeded() -> (HabitBook, MemoryStore) {
        let mut store = MemoryStore::new();
        let mut book = HabitBook::new();
        for (name, category) in [("Drink water", "health"), ("Exercise", "health"), ("Read", "learning")] {
            book.create(&mut store, new_habit(name, category), &now()).unwrap();
        }
        (book, store)
    }

    #[test]
    fn create_assigns_store_id_and_trailing_order() {
        let (book, store) = seeded();
        let orders: Vec<(&str, u32)> = book.habits().iter().map(|h| (h.id.as_str(), h.order)).collect();
        assert_eq!(orders, vec![("1", 0), ("2", 1), ("3", 2)]);
        assert_eq!(store.habits().len(), 3);
        let first = &book.habits()[0];
        assert!(!first.completed);
        assert_eq!(first.streak, 0);
        assert!(first.last_completed.is_none());
        assert_eq!(first.created_at, now());
    }

    #[test]
    fn create_rejects_blank_name_without_store_call() {
        let mut store = MemoryStore::new();
        let mut book = HabitBook::new();
        let err = book
            .create(&mut store, new_habit("   ", "health"), &now())
            .unwrap_err();
        assert!(matches!(err, HabitError::Validation(ValidationError::EmptyName)));
        assert!(store.calls().is_empty());
        assert!(book.is_empty());
    }

    #[test]
    fn create_failure_leaves_collection_untouched() {
        let (mut book, mut store) = seeded();
        store.fail(FailOn::Create);
        let err = book
            .create(&mut store, new_habit("Meditate", "health"), &now())
            .unwrap_err();
        assert!(matches!(err, HabitError::Store { op: StoreOp::Create, .. }));
        assert_eq!(book.len(), 3);
    }

    #[test]
    fn create_normalises_fields() {
        let mut store = MemoryStore::new();
        let mut book = HabitBook::new();
        let habit = book
            .create(
                &mut store,
                NewHabit {
                    name: "  Journal ".into(),
                    category: " Learning".into(),
                    goal: Some("  ".into()),
                    notes: Some("before bed".into()),
                },
                &now(),
            )
            .unwrap();
        assert_eq!(habit.name, "Journal");
        assert_eq!(habit.category, "learning");
        assert_eq!(habit.goal, None);
        assert_eq!(habit.notes.as_deref(), Some("before bed"));
    }

    #[test]
    fn toggle_commits_after_store_success() {
        let (mut book, mut store) = seeded();
        let toggled = book.toggle(&mut store, "1", &now()).unwrap();
        assert_eq!(toggled.change, StreakChange::Started);
        assert_eq!(toggled.habit.streak, 1);
        assert!(book.get("1").unwrap().completed);
        assert_eq!(store.get("1").unwrap().last_completed, Some(now()));
        assert!(toggled.message().contains("streak is now 1 day."));
    }

    #[test]
    fn toggle_failure_keeps_previous_state() {
        let (mut book, mut store) = seeded();
        store.fail_for(FailOn::Replace, "2");
        let before = book.get("2").unwrap().clone();
        let err = book.toggle(&mut store, "2", &now()).unwrap_err();
        assert!(matches!(err, HabitError::Store { op: StoreOp::Toggle, .. }));
        assert_eq!(book.get("2").unwrap(), &before);
    }

    #[test]
    fn toggle_unknown_id() {
        let (mut book, mut store) = seeded();
        assert!(matches!(
            book.toggle(&mut store, "99", &now()),
            Err(HabitError::NotFound(_))
        ));
    }

    #[test]
    fn toggle_next_day_extends_streak() {
        let (mut book, mut store) = seeded();
        book.toggle(&mut store, "1", &now()).unwrap();
        book.toggle(&mut store, "1", &(now() + Duration::hours(1))).unwrap();
        let next_day = now() + Duration::days(1);
        let toggled = book.toggle(&mut store, "1", &next_day).unwrap();
        assert_eq!(toggled.change, StreakChange::Extended);
        assert_eq!(toggled.habit.streak, 2);
    }

    #[test]
    fn edit_merges_only_edited_fields() {
        let (mut book, mut store) = seeded();
        book.toggle(&mut store, "2", &now()).unwrap();
        let edited = book
            .edit(
                &mut store,
                "2",
                HabitEdit {
                    name: Some("Morning run".into()),
                    goal: Some("5 km".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(edited.name, "Morning run");
        assert_eq!(edited.goal.as_deref(), Some("5 km"));
        assert_eq!(edited.category, "health");
        assert!(edited.completed);
        assert_eq!(edited.streak, 1);
        assert_eq!(edited.order, 1);
        assert_eq!(store.get("2").unwrap(), &edited);
    }

    #[test]
    fn edit_failure_discards_changes() {
        let (mut book, mut store) = seeded();
        store.fail(FailOn::Replace);
        let edit = HabitEdit {
            name: Some("Renamed".into()),
            ..Default::default()
        };
        assert!(book.edit(&mut store, "3", edit).is_err());
        assert_eq!(book.get("3").unwrap().name, "Read");
    }

    #[test]
    fn empty_edit_is_rejected() {
        let (mut book, mut store) = seeded();
        let err = book.edit(&mut store, "1", HabitEdit::default()).unwrap_err();
        assert!(matches!(err, HabitError::Validation(ValidationError::NoChanges)));
    }

    #[test]
    fn submit_dispatches_on_intent() {
        let (mut book, mut store) = seeded();
        let created = book
            .submit(
                &mut store,
                HabitIntent::Create(new_habit("Stretch", "health")),
                &now(),
            )
            .unwrap();
        assert_eq!(created.order, 3);
        let edited = book
            .submit(
                &mut store,
                HabitIntent::Edit {
                    id: created.id.clone(),
                    edit: HabitEdit {
                        category: Some("social".into()),
                        ..Default::default()
                    },
                },
                &now(),
            )
            .unwrap();
        assert_eq!(edited.category, "social");
        assert_eq!(book.len(), 4);
    }

    #[test]
    fn delete_requires_confirmation() {
        let (mut book, mut store) = seeded();
        let presenter = Scripted::answering(false);
        assert_eq!(book.delete(&mut store, "1", &presenter).unwrap(), Deleted::Cancelled);
        assert_eq!(book.len(), 3);
        assert_eq!(store.count_calls(FailOn::Delete), 0);
        assert!(presenter.asked.borrow()[0].contains("Drink water"));
    }

    #[test]
    fn delete_removes_after_store_success() {
        let (mut book, mut store) = seeded();
        let presenter = Scripted::answering(true);
        let deleted = book.delete(&mut store, "1", &presenter).unwrap();
        assert!(matches!(deleted, Deleted::Removed(ref h) if h.id == "1"));
        assert!(book.get("1").is_none());
        assert!(store.get("1").is_none());
    }

    #[test]
    fn delete_failure_keeps_habit() {
        let (mut book, mut store) = seeded();
        store.fail(FailOn::Delete);
        let presenter = Scripted::answering(true);
        assert!(book.delete(&mut store, "1", &presenter).is_err());
        assert!(book.get("1").is_some());
    }

    #[test]
    fn reorder_persists_only_changes() {
        let (mut book, mut store) = seeded();
        let seq: Vec<String> = ["1", "3", "2"].iter().map(|s| s.to_string()).collect();
        let result = book.reorder(&mut store, &seq, 0).unwrap();
        assert_eq!(result.persisted, 2);
        assert_eq!(store.count_calls(FailOn::Patch), 2);
        assert_eq!(book.sequence(), seq);
        assert_eq!(store.get("3").unwrap().order, 1);
    }

    #[test]
    fn reorder_twice_is_a_no_op_the_second_time() {
        let (mut book, mut store) = seeded();
        let seq: Vec<String> = ["3", "1", "2"].iter().map(|s| s.to_string()).collect();
        let first = book.reorder(&mut store, &seq, 0).unwrap();
        let second = book.reorder(&mut store, &seq, 0).unwrap();
        assert_eq!(first.plan.iter().map(|a| a.order).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(
            first.plan.iter().map(|a| (&a.id, a.order)).collect::<Vec<_>>(),
            second.plan.iter().map(|a| (&a.id, a.order)).collect::<Vec<_>>()
        );
        assert_eq!(second.persisted, 0);
    }

    #[test]
    fn reorder_retries_transient_failures() {
        struct Flaky {
            inner: MemoryStore,
            failures_left: u32,
        }

        impl HabitStore for Flaky {
            fn list(&mut self) -> Result<Vec<Habit>, StoreError> {
                self.inner.list()
            }
            fn create(&mut self, input: &HabitInput) -> Result<Habit, StoreError> {
                self.inner.create(input)
            }
            fn replace(&mut self, id: &str, habit: &Habit) -> Result<Habit, StoreError> {
                self.inner.replace(id, habit)
            }
            fn patch(&mut self, id: &str, patch: &HabitPatch) -> Result<Habit, StoreError> {
                if self.failures_left > 0 {
                    self.failures_left -= 1;
                    return Err(StoreError::Transport("reset by peer".into()));
                }
                self.inner.patch(id, patch)
            }
            fn delete(&mut self, id: &str) -> Result<(), StoreError> {
                self.inner.delete(id)
            }
        }

        let (mut book, inner) = seeded();
        let mut store = Flaky {
            inner,
            failures_left: 1,
        };
        let seq: Vec<String> = ["2", "1", "3"].iter().map(|s| s.to_string()).collect();
        assert!(book.reorder(&mut store, &seq, 1).is_ok());
        assert_eq!(store.inner.get("2").unwrap().order, 0);
        assert_eq!(store.inner.get("1").unwrap().order, 1);
    }

    #[test]
    fn move_habit_to_front() {
        let (mut book, mut store) = seeded();
        book.move_habit(&mut store, "3", 0, 0).unwrap();
        assert_eq!(book.sequence(), vec!["3", "1", "2"]);
        assert!(matches!(
            book.move_habit(&mut store, "42", 0, 0),
            Err(HabitError::NotFound(_))
        ));
    }

    #[test]
    fn refresh_sorts_by_order() {
        let (_, mut store) = seeded();
        store.patch("1", &HabitPatch::order(9)).unwrap();
        let book = HabitBook::load(&mut store).unwrap();
        assert_eq!(book.sequence(), vec!["2", "3", "1"]);
    }
}
