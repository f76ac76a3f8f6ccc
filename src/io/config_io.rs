use std::fs;
use std::path::{Path, PathBuf};

use crate::io::atomic_write;
use crate::model::config::HabitsConfig;
use crate::ops::reminder::ReminderSchedule;

/// Name of the data directory holding config.toml and the local store
pub const DATA_DIR: &str = ".habits";
pub const CONFIG_FILE: &str = "config.toml";

/// Error type for config and data-directory operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no .habits/ directory found (run `hab init`)")]
    NotInitialized,
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("could not edit config.toml: {0}")]
    EditError(#[from] toml_edit::TomlError),
    #[error("unknown config key: {0}")]
    UnknownKey(String),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Discover the data directory by walking up from `start`, looking for a
/// `.habits/` directory that contains config.toml.
pub fn discover_data_dir(start: &Path) -> Result<PathBuf, ConfigError> {
    let mut current = start.to_path_buf();
    loop {
        let data_dir = current.join(DATA_DIR);
        if data_dir.is_dir() && data_dir.join(CONFIG_FILE).exists() {
            return Ok(data_dir);
        }
        if !current.pop() {
            return Err(ConfigError::NotInitialized);
        }
    }
}

/// Read the config, returning both the parsed config and the raw toml_edit
/// document for round-trip-safe editing.
pub fn read_config(data_dir: &Path) -> Result<(HabitsConfig, toml_edit::DocumentMut), ConfigError> {
    let config_path = data_dir.join(CONFIG_FILE);
    let text = fs::read_to_string(&config_path).map_err(|e| ConfigError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: HabitsConfig = toml::from_str(&text)?;
    let doc: toml_edit::DocumentMut = text.parse()?;
    Ok((config, doc))
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(data_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), ConfigError> {
    let config_path = data_dir.join(CONFIG_FILE);
    atomic_write(&config_path, doc.to_string().as_bytes()).map_err(|e| ConfigError::ReadError {
        path: config_path,
        source: e,
    })
}

/// Keys accepted by `hab config set`
pub const SETTABLE_KEYS: &[&str] = &[
    "reminders.time",
    "reminders.days",
    "ui.theme",
    "store.backend",
    "store.reorder_retries",
];

/// Set one dotted key in the document. The value is validated by re-parsing
/// the edited document as a `HabitsConfig`, so a bad value never lands on disk.
pub fn set_value(doc: &mut toml_edit::DocumentMut, key: &str, raw: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    };
    let (table, field) = key.split_once('.').ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
    if !SETTABLE_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey(key.to_string()));
    }

    let value = match key {
        "reminders.days" => {
            let mut days = toml_edit::Array::new();
            for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                let day: i64 = part.parse().map_err(|_| invalid())?;
                if !(0..=6).contains(&day) {
                    return Err(invalid());
                }
                days.push(day);
            }
            toml_edit::value(days)
        }
        "store.reorder_retries" => {
            let n: i64 = raw.parse().map_err(|_| invalid())?;
            if n < 0 {
                return Err(invalid());
            }
            toml_edit::value(n)
        }
        _ => toml_edit::value(raw),
    };

    let mut edited = doc.clone();
    if !edited.contains_key(table) {
        edited[table] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    edited[table][field] = value;
    let config: HabitsConfig = toml::from_str(&edited.to_string()).map_err(|_| invalid())?;
    ReminderSchedule::from_config(&config.reminders).map_err(|_| invalid())?;
    *doc = edited;
    Ok(())
}

/// Append a category to `[categories] names`.
pub fn add_category_to_config(doc: &mut toml_edit::DocumentMut, name: &str) {
    if !doc.contains_key("categories") {
        doc["categories"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    let names = &mut doc["categories"]["names"];
    if names.is_none() {
        let mut defaults = toml_edit::Array::new();
        for c in crate::model::config::default_categories() {
            defaults.push(c);
        }
        *names = toml_edit::value(defaults);
    }
    if let Some(arr) = names.as_array_mut() {
        arr.push(name);
    }
}
