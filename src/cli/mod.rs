//! cli
//!
//! Command-line interface layer for coursekeeper.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the log subscriber
//! - Check staff access before maintenance commands
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to
//! handlers that call into [`crate::store`] and [`crate::publish`]. Branch
//! pointers only move through [`crate::publish::ForcePublish`].
//!
//! # Logging
//!
//! Library code logs through `tracing`. The filter comes from
//! `COURSEKEEPER_LOG` when set, else `debug` with `--debug`, `warn` with
//! `--quiet`, and `info` otherwise. Logs go to stderr.

pub mod args;
pub mod commands;
pub mod context;

pub use args::{Cli, Shell};
pub use context::Context;

use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "COURSEKEEPER_LOG";

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.debug, cli.quiet);

    let ctx = Context {
        store: cli.store.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
    };

    commands::dispatch(cli.command, &ctx)
}

fn init_logging(debug: bool, quiet: bool) {
    let default = match (debug, quiet) {
        (true, _) => "debug",
        (false, true) => "warn",
        (false, false) => "info",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    // Ignore a second initialization; the first subscriber stays active.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
