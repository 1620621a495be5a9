//! commands command - List available maintenance commands

use crate::cli::context::Context;
use crate::ui::output;
use anyhow::Result;

/// One entry of the maintenance dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaintenanceCommand {
    pub slug: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// CLI invocation that runs it.
    pub usage: &'static str,
}

/// Every maintenance command this tool offers.
pub const MAINTENANCE_COMMANDS: &[MaintenanceCommand] = &[MaintenanceCommand {
    slug: "force_publish_course",
    name: "Force Publish Course",
    description: "Force publish course.",
    usage: "ck force-publish <COURSE> [--dry-run]",
}];

/// Print the maintenance command table.
pub fn list_commands(ctx: &Context) -> Result<()> {
    let verbosity = ctx.verbosity();
    for command in MAINTENANCE_COMMANDS {
        output::print(
            format!(
                "{:<24} {}\n{:<24} {}\n{:<24} {}",
                command.slug, command.name, "", command.description, "", command.usage
            ),
            verbosity,
        );
    }
    Ok(())
}
