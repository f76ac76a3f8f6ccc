use serde::{Deserialize, Serialize};

/// Configuration from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HabitsConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub categories: CategoryConfig,
    #[serde(default)]
    pub reminders: ReminderConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Which store backs the habit collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    File,
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Default: see src/templates/config.toml
    #[serde(default = "default_store_file")]
    pub file: String,
    /// How many times a failed reorder patch is re-sent before giving up
    #[serde(default = "default_reorder_retries")]
    pub reorder_retries: u32,
    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            backend: StoreBackend::File,
            file: default_store_file(),
            reorder_retries: default_reorder_retries(),
            http: HttpConfig::default(),
        }
    }
}

fn default_store_file() -> String {
    "habits.json".to_string()
}

fn default_reorder_retries() -> u32 {
    1
}

/// Remote collection endpoint and its auth headers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_client")]
    pub client: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            base_url: String::new(),
            collection: default_collection(),
            user_id: String::new(),
            api_key: String::new(),
            client: default_client(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_collection() -> String {
    "habits".to_string()
}

fn default_client() -> String {
    "habitual".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Known categories, in display order. Habits may still use others.
    #[serde(default = "default_categories")]
    pub names: Vec<String>,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        CategoryConfig {
            names: default_categories(),
        }
    }
}

pub fn default_categories() -> Vec<String> {
    ["health", "productivity", "learning", "social", "other"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Local time of day, `HH:MM`
    #[serde(default = "default_reminder_time")]
    pub time: String,
    /// Weekdays to remind on, 0 = Sunday
    #[serde(default = "default_reminder_days")]
    pub days: Vec<u8>,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        ReminderConfig {
            time: default_reminder_time(),
            days: default_reminder_days(),
        }
    }
}

fn default_reminder_time() -> String {
    "09:00".to_string()
}

fn default_reminder_days() -> Vec<u8> {
    (0..7).collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub theme: Theme,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: HabitsConfig = toml::from_str("").unwrap();
        assert_eq!(config.store.backend, StoreBackend::File);
        assert_eq!(config.store.file, "habits.json");
        assert_eq!(config.store.reorder_retries, 1);
        assert_eq!(config.categories.names.len(), 5);
        assert_eq!(config.reminders.time, "09:00");
        assert_eq!(config.reminders.days, vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(config.ui.theme, Theme::Light);
    }

    #[test]
    fn http_section_parses() {
        let config: HabitsConfig = toml::from_str(
            r#"
[store]
backend = "http"

[store.http]
base_url = "https://habits.example.com/api"
user_id = "u-1"
api_key = "k"
"#,
        )
        .unwrap();
        assert_eq!(config.store.backend, StoreBackend::Http);
        assert_eq!(config.store.http.collection, "habits");
        assert_eq!(config.store.http.timeout_secs, 10);
        assert_eq!(config.store.http.user_id, "u-1");
    }

    #[test]
    fn theme_toggles() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled().as_str(), "light");
    }
}
