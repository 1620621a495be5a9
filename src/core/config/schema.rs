//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$COURSEKEEPER_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/coursekeeper/config.toml`
//! 3. `~/.coursekeeper/config.toml` (canonical write location)
//!
//! # Store Config
//!
//! Located at `<store>/config.toml`.
//!
//! # Validation
//!
//! Config values are validated after parsing (e.g., staff entries must be
//! valid actor names).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::Actor;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// store = "/srv/coursekeeper"
/// actor = "ops-oncall"
/// staff = ["ops-oncall", "escalations"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Store root directory
    pub store: Option<PathBuf>,

    /// Default acting identity
    pub actor: Option<String>,

    /// Identities allowed to run maintenance commands
    pub staff: Option<Vec<String>>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(store) = &self.store {
            if store.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "store cannot be empty".to_string(),
                ));
            }
        }

        if let Some(actor) = &self.actor {
            Actor::new(actor.as_str())
                .map_err(|e| ConfigError::InvalidValue(format!("invalid actor: {}", e)))?;
        }

        validate_staff(self.staff.as_deref())
    }
}

/// Store configuration.
///
/// # Example
///
/// ```toml
/// staff = ["escalations"]
///
/// [audit]
/// enabled = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Identities allowed to run maintenance commands (overrides global)
    pub staff: Option<Vec<String>>,

    /// Audit log settings
    pub audit: Option<AuditConfig>,
}

impl StoreConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_staff(self.staff.as_deref())
    }
}

/// Audit log settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AuditConfig {
    /// Write audit entries to the store's audit log
    pub enabled: Option<bool>,
}

fn validate_staff(staff: Option<&[String]>) -> Result<(), ConfigError> {
    for name in staff.unwrap_or_default() {
        Actor::new(name.as_str()).map_err(|e| {
            ConfigError::InvalidValue(format!("invalid staff entry '{}': {}", name, e))
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_config_parses() {
        let config: GlobalConfig = toml::from_str(
            r#"
            store = "/srv/ck"
            actor = "ops"
            staff = ["ops", "escalations"]
            "#,
        )
        .unwrap();

        assert_eq!(config.store, Some(PathBuf::from("/srv/ck")));
        assert_eq!(config.actor.as_deref(), Some("ops"));
        assert_eq!(config.staff.as_ref().map(Vec::len), Some(2));
        config.validate().unwrap();
    }

    #[test]
    fn unknown_fields_rejected() {
        let result: Result<GlobalConfig, _> = toml::from_str("trunk = \"main\"");
        assert!(result.is_err());

        let result: Result<StoreConfig, _> = toml::from_str("[audit]\nsink = \"x\"");
        assert!(result.is_err());
    }

    #[test]
    fn invalid_actor_rejected() {
        let config = GlobalConfig {
            actor: Some(String::new()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_store_rejected() {
        let config = GlobalConfig {
            store: Some(PathBuf::new()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_staff_entry_rejected() {
        let config = StoreConfig {
            staff: Some(vec!["ok".into(), " padded".into()]),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("padded"));
    }

    #[test]
    fn store_config_with_audit() {
        let config: StoreConfig = toml::from_str("[audit]\nenabled = false").unwrap();
        assert_eq!(config.audit.and_then(|a| a.enabled), Some(false));
    }
}
