//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! Coursekeeper has two configuration scopes:
//! - **Global**: User-level settings
//! - **Store**: Settings stored alongside the course data
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Store config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$COURSEKEEPER_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/coursekeeper/config.toml`
//! 3. `~/.coursekeeper/config.toml` (canonical write location)
//!
//! # Store Root
//!
//! The store root is the `--store` flag, else `store` from the global
//! config, else `~/.coursekeeper/store`. The store config is read from
//! `<store>/config.toml`.
//!
//! # Example
//!
//! ```no_run
//! use coursekeeper::core::config::Config;
//!
//! let config = Config::load(None).unwrap();
//! println!("Store: {}", config.store_root().display());
//! println!("Audit enabled: {}", config.audit_enabled());
//! ```

pub mod schema;

pub use schema::{AuditConfig, GlobalConfig, StoreConfig};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::paths::StorePaths;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Merged configuration from all sources.
///
/// Accessor methods apply precedence rules: store config overrides global.
#[derive(Debug, Clone)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Store configuration (if present)
    pub store: Option<StoreConfig>,
    store_root: PathBuf,
    global_path: Option<PathBuf>,
    store_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// `store_override` (the `--store` flag) takes precedence over the
    /// global `store` setting.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed, or if
    /// no store root can be determined.
    pub fn load(store_override: Option<&Path>) -> Result<Config, ConfigError> {
        let global_path = Self::find_global();
        Self::load_from(global_path.as_deref(), store_override)
    }

    /// Load configuration from an explicit global config file.
    ///
    /// A missing `global_path` file is treated like no global config.
    pub fn load_from(
        global_path: Option<&Path>,
        store_override: Option<&Path>,
    ) -> Result<Config, ConfigError> {
        let (global, global_path) = match global_path {
            Some(path) if path.exists() => (Self::read_toml(path)?, Some(path.to_path_buf())),
            _ => (GlobalConfig::default(), None),
        };
        global.validate()?;

        let store_root = match (store_override, &global.store) {
            (Some(path), _) => path.to_path_buf(),
            (None, Some(path)) => path.clone(),
            (None, None) => Self::default_store_root()?,
        };

        let store_config_path = StorePaths::new(store_root.clone()).config_path();
        let (store, store_path) = if store_config_path.exists() {
            let config: StoreConfig = Self::read_toml(&store_config_path)?;
            config.validate()?;
            (Some(config), Some(store_config_path))
        } else {
            (None, None)
        };

        Ok(Config {
            global,
            store,
            store_root,
            global_path,
            store_path,
        })
    }

    /// Locate the global config file, if any exists.
    fn find_global() -> Option<PathBuf> {
        // 1. Check $COURSEKEEPER_CONFIG
        if let Ok(path) = std::env::var("COURSEKEEPER_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check $XDG_CONFIG_HOME/coursekeeper/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("coursekeeper/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.coursekeeper/config.toml
        let path = dirs::home_dir()?.join(".coursekeeper/config.toml");
        path.exists().then_some(path)
    }

    fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Default store root: `~/.coursekeeper/store`.
    pub fn default_store_root() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".coursekeeper/store"))
    }

    /// Write store config atomically.
    ///
    /// Creates parent directories if needed. Writes to a temp file and
    /// renames it into place to prevent corruption.
    pub fn write_store(store_root: &Path, config: &StoreConfig) -> Result<PathBuf, ConfigError> {
        let path = StorePaths::new(store_root.to_path_buf()).config_path();
        Self::write_config_atomic(&path, config)?;
        Ok(path)
    }

    fn write_config_atomic<T: serde::Serialize>(
        path: &Path,
        config: &T,
    ) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(contents.as_bytes())
            .map_err(|e| ConfigError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;

        file.sync_all().map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Store root directory.
    pub fn store_root(&self) -> &Path {
        &self.store_root
    }

    /// Default acting identity, if configured.
    pub fn actor(&self) -> Option<&str> {
        self.global.actor.as_deref()
    }

    /// Identities allowed to run maintenance commands.
    ///
    /// Store config overrides global. Empty if neither sets it.
    pub fn staff(&self) -> &[String] {
        self.store
            .as_ref()
            .and_then(|s| s.staff.as_deref())
            .or(self.global.staff.as_deref())
            .unwrap_or_default()
    }

    /// Whether audit entries are written to the store's audit log.
    ///
    /// Defaults to `true` if not configured.
    pub fn audit_enabled(&self) -> bool {
        self.store
            .as_ref()
            .and_then(|s| s.audit.as_ref())
            .and_then(|a| a.enabled)
            .unwrap_or(true)
    }

    /// Path the global config was loaded from.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Path the store config was loaded from.
    pub fn store_config_loaded_from(&self) -> Option<&Path> {
        self.store_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_without_files() {
        let temp = TempDir::new().unwrap();
        let store = temp.path().join("store");

        let config = Config::load_from(None, Some(&store)).unwrap();
        assert_eq!(config.store_root(), store);
        assert!(config.actor().is_none());
        assert!(config.staff().is_empty());
        assert!(config.audit_enabled());
        assert!(config.global_config_loaded_from().is_none());
        assert!(config.store_config_loaded_from().is_none());
    }

    #[test]
    fn global_store_used_without_override() {
        let temp = TempDir::new().unwrap();
        let global = temp.path().join("config.toml");
        let store = temp.path().join("from-global");
        fs::write(
            &global,
            format!("store = {:?}\nactor = \"ops\"\n", store.display().to_string()),
        )
        .unwrap();

        let config = Config::load_from(Some(&global), None).unwrap();
        assert_eq!(config.store_root(), store);
        assert_eq!(config.actor(), Some("ops"));
        assert_eq!(config.global_config_loaded_from(), Some(global.as_path()));
    }

    #[test]
    fn override_beats_global_store() {
        let temp = TempDir::new().unwrap();
        let global = temp.path().join("config.toml");
        fs::write(&global, "store = \"/nonexistent/elsewhere\"\n").unwrap();
        let store = temp.path().join("flag");

        let config = Config::load_from(Some(&global), Some(&store)).unwrap();
        assert_eq!(config.store_root(), store);
    }

    #[test]
    fn store_config_overrides_global_staff() {
        let temp = TempDir::new().unwrap();
        let global = temp.path().join("config.toml");
        fs::write(&global, "staff = [\"global-admin\"]\n").unwrap();
        let store = temp.path().join("store");

        let config = Config::load_from(Some(&global), Some(&store)).unwrap();
        assert_eq!(config.staff(), ["global-admin".to_string()]);

        Config::write_store(
            &store,
            &StoreConfig {
                staff: Some(vec!["store-admin".into()]),
                audit: Some(AuditConfig {
                    enabled: Some(false),
                }),
            },
        )
        .unwrap();

        let config = Config::load_from(Some(&global), Some(&store)).unwrap();
        assert_eq!(config.staff(), ["store-admin".to_string()]);
        assert!(!config.audit_enabled());
        assert!(config.store_config_loaded_from().is_some());
    }

    #[test]
    fn write_store_is_atomic() {
        let temp = TempDir::new().unwrap();
        let store = temp.path().join("store");

        let path = Config::write_store(&store, &StoreConfig::default()).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn parse_error_reports_path() {
        let temp = TempDir::new().unwrap();
        let global = temp.path().join("config.toml");
        fs::write(&global, "store = [").unwrap();

        let err = Config::load_from(Some(&global), Some(temp.path())).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn invalid_store_staff_rejected() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("config.toml"), "staff = [\"\"]\n").unwrap();

        let err = Config::load_from(None, Some(temp.path())).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }
}
