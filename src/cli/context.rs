//! cli::context
//!
//! Per-invocation state shared by command handlers.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};

use crate::core::config::Config;
use crate::core::paths::StorePaths;
use crate::core::types::Actor;
use crate::store::{FileStore, LegacyStore, MixedStore};
use crate::ui::output::Verbosity;

/// Execution context built from global flags.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Store directory override (`--store`).
    pub store: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
}

/// Backends of one store, opened together.
pub struct Stores {
    pub paths: StorePaths,
    pub versioned: Arc<FileStore>,
    pub legacy: Arc<LegacyStore>,
    /// Routes to `versioned` first, then `legacy`.
    pub mixed: MixedStore,
}

impl Context {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }

    /// Load configuration honoring `--store`.
    pub fn config(&self) -> Result<Config> {
        Config::load(self.store.as_deref()).context("Failed to load configuration")
    }

    /// Open every backend under the configured store root.
    pub fn open_stores(&self, config: &Config) -> Result<Stores> {
        let paths = StorePaths::new(config.store_root().to_path_buf());
        let versioned = Arc::new(
            FileStore::open(paths.clone())
                .with_context(|| format!("Failed to open store at {}", paths.root().display()))?,
        );
        let legacy = Arc::new(
            LegacyStore::open(paths.clone())
                .with_context(|| format!("Failed to open store at {}", paths.root().display()))?,
        );
        let mixed = MixedStore::new()
            .with_backend(versioned.clone())
            .with_backend(legacy.clone());

        Ok(Stores {
            paths,
            versioned,
            legacy,
            mixed,
        })
    }

    /// Acting identity: `--actor`, else config `actor`, else `$USER`.
    pub fn actor(&self, flag: Option<&str>, config: &Config) -> Result<Actor> {
        let name = match (flag, config.actor()) {
            (Some(name), _) => name.to_string(),
            (None, Some(name)) => name.to_string(),
            (None, None) => match std::env::var("USER") {
                Ok(name) if !name.is_empty() => name,
                _ => bail!("No actor: pass --actor or set `actor` in the config"),
            },
        };
        Actor::new(name.as_str()).with_context(|| format!("Invalid actor '{}'", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::VersionStore;
    use tempfile::TempDir;

    fn ctx(temp: &TempDir) -> Context {
        Context {
            store: Some(temp.path().join("store")),
            ..Default::default()
        }
    }

    #[test]
    fn flag_actor_wins() {
        let temp = TempDir::new().unwrap();
        let ctx = ctx(&temp);
        let config = Config::load_from(None, ctx.store.as_deref()).unwrap();

        let actor = ctx.actor(Some("ops"), &config).unwrap();
        assert_eq!(actor.as_str(), "ops");
    }

    #[test]
    fn invalid_flag_actor_rejected() {
        let temp = TempDir::new().unwrap();
        let ctx = ctx(&temp);
        let config = Config::load_from(None, ctx.store.as_deref()).unwrap();

        assert!(ctx.actor(Some(" padded"), &config).is_err());
    }

    #[test]
    fn config_actor_used_without_flag() {
        let temp = TempDir::new().unwrap();
        let global = temp.path().join("config.toml");
        std::fs::write(&global, "actor = \"from-config\"\n").unwrap();
        let ctx = ctx(&temp);
        let config = Config::load_from(Some(&global), ctx.store.as_deref()).unwrap();

        assert_eq!(ctx.actor(None, &config).unwrap().as_str(), "from-config");
    }

    #[test]
    fn stores_share_one_root() {
        let temp = TempDir::new().unwrap();
        let ctx = ctx(&temp);
        let config = Config::load_from(None, ctx.store.as_deref()).unwrap();

        let stores = ctx.open_stores(&config).unwrap();
        assert_eq!(stores.paths.root(), temp.path().join("store"));
        assert!(stores.paths.legacy_dir().is_dir());

        let course = "e/d/X".parse().unwrap();
        stores
            .legacy
            .register(&course, &Actor::new("ops").unwrap())
            .unwrap();
        assert!(!stores.versioned.has_course(&course));
        assert!(stores.mixed.has_course(&course));
    }
}
