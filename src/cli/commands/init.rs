//! init command - Create the store layout

use crate::cli::context::Context;
use crate::core::config::{Config, StoreConfig};
use crate::ui::output;
use anyhow::{Context as _, Result};

/// Create the store directories and a default store config.
///
/// Existing config and data are left as they are.
pub fn init(ctx: &Context) -> Result<()> {
    let verbosity = ctx.verbosity();
    let config = ctx.config()?;
    let stores = ctx.open_stores(&config)?;

    match config.store_config_loaded_from() {
        Some(path) => output::debug(
            format!("Keeping existing store config {}", path.display()),
            verbosity,
        ),
        None => {
            let path = Config::write_store(stores.paths.root(), &StoreConfig::default())
                .context("Failed to write store config")?;
            output::debug(format!("Wrote {}", path.display()), verbosity);
        }
    }

    if config.staff().is_empty() {
        output::warn(
            "No staff configured; force-publish will refuse every actor until `staff` is set",
            verbosity,
        );
    }

    output::success(
        format!("Initialized store at {}", stores.paths.root().display()),
        verbosity,
    );
    Ok(())
}
