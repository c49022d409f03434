//! Application configuration
//!
//! A small JSON file next to the database tunes the few knobs the core
//! exposes. Missing or unreadable configuration always degrades to the
//! defaults; a bad config file must never keep the inventory from opening.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::state::expiry::EXPIRING_SOON_WINDOW_DAYS;
use crate::state::repository::RepositoryOptions;
use crate::state::store::Inventory;

/// User-tunable settings, persisted as JSON
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Explicit database location; `None` means the platform default
    pub db_path: Option<PathBuf>,
    /// Days ahead within which items are flagged as expiring soon
    pub expiring_soon_window_days: i64,
    /// Reject image rows that reference a nonexistent item
    pub strict_references: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            db_path: None,
            expiring_soon_window_days: EXPIRING_SOON_WINDOW_DAYS,
            strict_references: false,
        }
    }
}

impl AppConfig {
    /// Convert to JSON string for storage
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Where the config file lives: beside the default database
    pub fn default_config_path() -> PathBuf {
        let mut path = Inventory::default_db_path();
        path.set_file_name("config.json");
        path
    }

    /// Load the configuration from the default location.
    /// Any failure (no file, unreadable, malformed JSON) yields the defaults.
    pub fn load() -> Self {
        Self::load_from(&Self::default_config_path())
    }

    /// Load from an explicit path, falling back to defaults on any failure
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => Self::from_json(&json).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Write the configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = self
            .to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }

    /// The repository behavior this configuration asks for
    pub fn repository_options(&self) -> RepositoryOptions {
        RepositoryOptions {
            strict_references: self.strict_references,
            expiring_soon_window_days: self.expiring_soon_window_days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip() {
        let config = AppConfig {
            db_path: Some(PathBuf::from("/tmp/inventory-test.db")),
            expiring_soon_window_days: 14,
            strict_references: true,
        };

        let json = config.to_json().unwrap();
        let restored = AppConfig::from_json(&json).unwrap();

        assert_eq!(config, restored);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config, AppConfig::default());

        let config = AppConfig::from_json(r#"{"strict_references": true}"#).unwrap();
        assert!(config.strict_references);
        assert_eq!(config.expiring_soon_window_days, EXPIRING_SOON_WINDOW_DAYS);
    }

    #[test]
    fn test_save_and_reload() {
        let path = std::env::temp_dir().join("home-inventory-config-test.json");
        let config = AppConfig {
            db_path: None,
            expiring_soon_window_days: 5,
            strict_references: true,
        };

        config.save_to(&path).unwrap();
        assert_eq!(AppConfig::load_from(&path), config);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_from_missing_file_is_default() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.json"));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_repository_options_mapping() {
        let mut config = AppConfig::default();
        config.strict_references = true;
        config.expiring_soon_window_days = 3;

        let options = config.repository_options();
        assert!(options.strict_references);
        assert_eq!(options.expiring_soon_window_days, 3);
    }
}
