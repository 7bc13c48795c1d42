//! Configuration loading for the catalog.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at `~/.config/catalog/config.toml`
//! (platform equivalent via `directories`).

use config::{Config, Environment, File};
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Settings for the topic renumbering pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReindexSettings {
    /// When false, deleting a topic records DELETED but leaves the
    /// surviving aliases untouched.
    #[serde(default = "default_reindex_enabled")]
    pub enabled: bool,

    /// Reason written into the details of each REINDEXED row.
    #[serde(default = "default_reindex_reason")]
    pub reason: String,
}

fn default_reindex_enabled() -> bool {
    true
}

fn default_reindex_reason() -> String {
    "Re-indexing after deletion".to_string()
}

impl Default for ReindexSettings {
    fn default() -> Self {
        Self {
            enabled: default_reindex_enabled(),
            reason: default_reindex_reason(),
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to RocksDB storage directory
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Renumbering behaviour on topic deletion
    #[serde(default)]
    pub reindex: ReindexSettings,
}

fn default_db_path() -> String {
    ProjectDirs::from("", "", "catalog")
        .map(|p| p.data_local_dir().join("db"))
        .unwrap_or_else(|| PathBuf::from("./data"))
        .to_string_lossy()
        .to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_level: default_log_level(),
            reindex: ReindexSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/catalog/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (CATALOG_*, nested keys joined by `__`)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, ConfigError> {
        let config_dir = ProjectDirs::from("", "", "catalog")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("db_path", default_db_path())?
            .set_default("log_level", default_log_level())?
            .set_default("reindex.enabled", default_reindex_enabled())?
            .set_default("reindex.reason", default_reindex_reason())?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // CATALOG_DB_PATH, CATALOG_LOG_LEVEL, CATALOG_REINDEX__ENABLED
        builder = builder.add_source(
            Environment::with_prefix("CATALOG")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that would make the catalog unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db_path.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "db_path",
                reason: "must not be empty".to_string(),
            });
        }
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid {
                field: "log_level",
                reason: format!("expected one of {:?}, got {}", LOG_LEVELS, self.log_level),
            });
        }
        Ok(())
    }

    /// Expand ~ in db_path to actual home directory
    pub fn expanded_db_path(&self) -> PathBuf {
        if let Some(rest) = self.db_path.strip_prefix("~/") {
            if let Some(dirs) = BaseDirs::new() {
                return dirs.home_dir().join(rest);
            }
        }
        PathBuf::from(&self.db_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.log_level, "info");
        assert!(settings.reindex.enabled);
        assert_eq!(settings.reindex.reason, "Re-indexing after deletion");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("catalog.toml");
        std::fs::write(
            &path,
            "db_path = \"/srv/catalog\"\nlog_level = \"debug\"\n[reindex]\nenabled = false\n",
        )
        .unwrap();

        let settings = Settings::load(Some(&path.to_string_lossy())).unwrap();
        assert_eq!(settings.db_path, "/srv/catalog");
        assert_eq!(settings.log_level, "debug");
        assert!(!settings.reindex.enabled);
        assert_eq!(settings.reindex.reason, "Re-indexing after deletion");
    }

    #[test]
    fn test_missing_cli_file_is_an_error() {
        let result = Settings::load(Some("/nonexistent/catalog-config.toml"));
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut settings = Settings::default();
        settings.log_level = "loud".to_string();
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::Invalid { field: "log_level", .. })
        ));

        let mut settings = Settings::default();
        settings.db_path = "  ".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_expanded_db_path_plain() {
        let mut settings = Settings::default();
        settings.db_path = "/var/lib/catalog".to_string();
        assert_eq!(settings.expanded_db_path(), PathBuf::from("/var/lib/catalog"));
    }
}
