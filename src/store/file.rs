use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::io::atomic_write;
use crate::io::lock::StoreLock;
use crate::model::habit::{Habit, HabitInput, HabitPatch};
use crate::store::{HabitStore, StoreError};

/// On-disk shape of habits.json
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreDocument {
    /// Next id to hand out; only ever grows
    next_id: u64,
    #[serde(default)]
    habits: Vec<Habit>,
}

impl Default for StoreDocument {
    fn default() -> Self {
        StoreDocument {
            next_id: 1,
            habits: Vec::new(),
        }
    }
}

/// Habit store backed by a JSON document on local disk.
///
/// Every call takes the store lock, reads the document, applies the change and
/// writes it back atomically, so the file is always the source of truth even
/// with several `hab` processes running.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore { path: path.into() }
    }

    fn read(&self) -> Result<StoreDocument, StoreError> {
        if !self.path.exists() {
            return Ok(StoreDocument::default());
        }
        let text = fs::read_to_string(&self.path).map_err(|e| StoreError::Io {
            path: self.path.clone(),
            source: e,
        })?;
        if text.trim().is_empty() {
            return Ok(StoreDocument::default());
        }
        let doc = serde_json::from_str(&text)?;
        Ok(doc)
    }

    fn write(&self, doc: &StoreDocument) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(doc)?;
        atomic_write(&self.path, content.as_bytes()).map_err(|e| StoreError::Io {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Run a read-modify-write cycle under the store lock. The document is
    /// only written back when `f` succeeds.
    fn update<T>(
        &self,
        f: impl FnOnce(&mut StoreDocument) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _lock = StoreLock::acquire_default(&self.path).map_err(|e| StoreError::Locked {
            path: e.path().to_path_buf(),
        })?;
        let mut doc = self.read()?;
        let out = f(&mut doc)?;
        self.write(&doc)?;
        Ok(out)
    }
}

fn find_mut<'a>(doc: &'a mut StoreDocument, id: &str) -> Result<&'a mut Habit, StoreError> {
    doc.habits
        .iter_mut()
        .find(|h| h.id == id)
        .ok_or_else(|| StoreError::NotFound(id.to_string()))
}

impl HabitStore for FileStore {
    fn list(&mut self) -> Result<Vec<Habit>, StoreError> {
        let doc = self.read()?;
        log::debug!("[STORE] file list: {} habits", doc.habits.len());
        Ok(doc.habits)
    }

    fn create(&mut self, input: &HabitInput) -> Result<Habit, StoreError> {
        let habit = self.update(|doc| {
            let id = doc.next_id;
            doc.next_id += 1;
            let habit = Habit::from_input(id.to_string(), input.clone());
            doc.habits.push(habit.clone());
            Ok(habit)
        })?;
        log::debug!("[STORE] file create: {}", habit.id);
        Ok(habit)
    }

    fn replace(&mut self, id: &str, habit: &Habit) -> Result<Habit, StoreError> {
        log::debug!("[STORE] file replace: {}", id);
        self.update(|doc| {
            let stored = find_mut(doc, id)?;
            *stored = habit.clone();
            stored.id = id.to_string();
            Ok(stored.clone())
        })
    }

    fn patch(&mut self, id: &str, patch: &HabitPatch) -> Result<Habit, StoreError> {
        log::debug!("[STORE] file patch: {}", id);
        self.update(|doc| {
            let stored = find_mut(doc, id)?;
            stored.apply_patch(patch);
            Ok(stored.clone())
        })
    }

    fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        log::debug!("[STORE] file delete: {}", id);
        self.update(|doc| {
            let before = doc.habits.len();
            doc.habits.retain(|h| h.id != id);
            if doc.habits.len() == before {
                return Err(StoreError::NotFound(id.to_string()));
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn input(name: &str, order: u32) -> HabitInput {
        HabitInput {
            name: name.into(),
            category: "health".into(),
            goal: Some("8 glasses".into()),
            notes: None,
            completed: false,
            streak: 0,
            last_completed: None,
            created_at: Utc.with_ymd_and_hms(2025, 5, 1, 7, 30, 0).unwrap(),
            order,
        }
    }

    #[test]
    fn missing_file_lists_empty() {
        let tmp = TempDir::new().unwrap();
        let mut store = FileStore::new(tmp.path().join("habits.json"));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn create_then_list_round_trip() {
        let tmp = TempDir::new().unwrap();
        let mut store = FileStore::new(tmp.path().join("habits.json"));
        let created = store.create(&input("Drink water", 0)).unwrap();
        assert_eq!(created.id, "1");

        // A fresh handle sees what the first one wrote
        let mut reopened = FileStore::new(tmp.path().join("habits.json"));
        let listed = reopened.list().unwrap();
        assert_eq!(listed, vec![created]);
        assert_eq!(listed[0].goal.as_deref(), Some("8 glasses"));
    }

    #[test]
    fn deleted_ids_are_retired() {
        let tmp = TempDir::new().unwrap();
        let mut store = FileStore::new(tmp.path().join("habits.json"));
        let a = store.create(&input("a", 0)).unwrap();
        store.delete(&a.id).unwrap();
        let b = store.create(&input("b", 0)).unwrap();
        assert_eq!(b.id, "2");
    }

    #[test]
    fn patch_and_replace_unknown_id_fail() {
        let tmp = TempDir::new().unwrap();
        let mut store = FileStore::new(tmp.path().join("habits.json"));
        let a = store.create(&input("a", 0)).unwrap();
        assert!(matches!(
            store.patch("99", &HabitPatch::order(1)),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(store.replace("99", &a), Err(StoreError::NotFound(_))));
        assert!(matches!(store.delete("99"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn patch_changes_only_order() {
        let tmp = TempDir::new().unwrap();
        let mut store = FileStore::new(tmp.path().join("habits.json"));
        let a = store.create(&input("a", 0)).unwrap();
        let patched = store.patch(&a.id, &HabitPatch::order(5)).unwrap();
        assert_eq!(patched.order, 5);
        assert_eq!(patched.name, "a");
        assert_eq!(store.list().unwrap()[0].order, 5);
    }

    #[test]
    fn malformed_document_is_reported() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("habits.json");
        fs::write(&path, "{ not json").unwrap();
        let mut store = FileStore::new(path);
        assert!(matches!(store.list(), Err(StoreError::Malformed(_))));
    }

    #[test]
    fn concurrent_writers_lose_nothing() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("habits.json");

        let workers: Vec<_> = (0..8)
            .map(|w| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let mut store = FileStore::new(path);
                    for i in 0..25 {
                        store.create(&input(&format!("w{} #{}", w, i), 0)).unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let listed = FileStore::new(&path).list().unwrap();
        assert_eq!(listed.len(), 200);
        let ids: std::collections::HashSet<&str> = listed.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids.len(), 200);
    }
}
