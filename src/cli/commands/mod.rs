//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads configuration and opens the store
//! 2. Calls the library operation
//! 3. Formats and displays output
//!
//! Handlers do NOT move branch pointers directly; force-publish goes
//! through [`crate::publish::ForcePublish`].

mod audit_cmd;
mod completion;
mod course;
mod force_publish;
mod init;
mod registry;
mod versions;

// Re-export command functions for testing and direct invocation
pub use audit_cmd::audit;
pub use completion::completion;
pub use course::{create as course_create, stage as course_stage};
pub use force_publish::force_publish;
pub use init::init;
pub use registry::{list_commands, MaintenanceCommand, MAINTENANCE_COMMANDS};
pub use versions::versions;

use crate::cli::args::{Command, CourseAction};
use crate::cli::context::Context;
use anyhow::Result;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Init => init::init(ctx),
        Command::Commands => registry::list_commands(ctx),
        Command::Versions { course, json } => versions::versions(ctx, &course, json),
        Command::ForcePublish {
            course,
            dry_run,
            actor,
            json,
        } => force_publish::force_publish(ctx, &course, dry_run, actor.as_deref(), json),
        Command::Course(action) => match action {
            CourseAction::Create {
                course,
                legacy,
                actor,
            } => course::create(ctx, &course, legacy, actor.as_deref()),
            CourseAction::Stage {
                course,
                content,
                actor,
            } => course::stage(ctx, &course, &content, actor.as_deref()),
        },
        Command::Audit { limit, json } => audit_cmd::audit(ctx, limit, json),
        Command::Completion { shell } => completion::completion(shell),
    }
}
