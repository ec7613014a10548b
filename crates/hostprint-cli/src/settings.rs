//! Global settings table of the system host
//!
//! A small name/value store backing three surfaces: the static
//! `Settings$Global.getString` accessor, the `content://settings/global`
//! content URI, and the developer-mode probe.

use std::collections::BTreeMap;
use std::path::Path;

use hostprint_engine::{CollaboratorError, ContentReader, ContentRow, DeveloperModeProbe};

/// URI the settings table is published under
pub const SETTINGS_URI: &str = "content://settings/global";

/// Setting read by the developer-mode probe
pub const DEVELOPMENT_SETTINGS_ENABLED: &str = "development_settings_enabled";

/// Remote debugging toggle
pub const ADB_ENABLED: &str = "adb_enabled";

/// Human-readable machine name
pub const DEVICE_NAME: &str = "device_name";

/// Configured time zone
pub const TIME_ZONE: &str = "time_zone";

/// Name/value settings table
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    values: BTreeMap<String, String>,
}

impl SettingsStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings derived from the local machine
    pub fn from_environment() -> Self {
        let mut store = Self::new()
            .with(ADB_ENABLED, "0")
            .with(DEVELOPMENT_SETTINGS_ENABLED, if cfg!(debug_assertions) { "1" } else { "0" });
        if let Some(name) = hostname() {
            store = store.with(DEVICE_NAME, name);
        }
        if let Ok(tz) = std::env::var("TZ") {
            store = store.with(TIME_ZONE, tz);
        }
        store
    }

    /// Set a value
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Look up a value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

impl ContentReader for SettingsStore {
    fn query(&self, uri: &str) -> Result<Vec<ContentRow>, CollaboratorError> {
        if uri != SETTINGS_URI {
            return Err(CollaboratorError::Unavailable(uri.to_string()));
        }
        Ok(self
            .values
            .iter()
            .map(|(name, value)| {
                vec![
                    ("name".to_string(), Some(name.clone())),
                    ("value".to_string(), Some(value.clone())),
                ]
            })
            .collect())
    }
}

impl DeveloperModeProbe for SettingsStore {
    fn developer_mode(&self) -> Result<i64, CollaboratorError> {
        let raw = self
            .get(DEVELOPMENT_SETTINGS_ENABLED)
            .ok_or_else(|| CollaboratorError::Unavailable(DEVELOPMENT_SETTINGS_ENABLED.to_string()))?;
        raw.trim().parse().map_err(|_| {
            CollaboratorError::Unavailable(format!("{} = {:?}", DEVELOPMENT_SETTINGS_ENABLED, raw))
        })
    }
}

fn hostname() -> Option<String> {
    std::fs::read_to_string(Path::new("/etc/hostname"))
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| std::env::var("HOSTNAME").ok())
}
