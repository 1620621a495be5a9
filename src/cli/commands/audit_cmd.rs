//! audit command - Show force-publish audit entries

use crate::audit::{AuditEntry, FileAuditLog};
use crate::cli::context::Context;
use crate::core::paths::StorePaths;
use crate::ui::output;
use anyhow::{Context as _, Result};

/// Print audit entries, oldest first.
pub fn audit(ctx: &Context, limit: Option<usize>, json: bool) -> Result<()> {
    let verbosity = ctx.verbosity();
    let config = ctx.config()?;
    let log = FileAuditLog::new(&StorePaths::new(config.store_root().to_path_buf()));

    let entries = match limit {
        Some(limit) => log.read_recent(limit),
        None => log.read_all(),
    }
    .with_context(|| format!("Failed to read audit log {}", log.path().display()))?;

    if json {
        for entry in &entries {
            println!("{}", serde_json::to_string(entry)?);
        }
        return Ok(());
    }

    if entries.is_empty() {
        output::print("No audit entries.", verbosity);
        return Ok(());
    }
    for entry in &entries {
        output::print(format_entry(entry), verbosity);
    }
    Ok(())
}

fn format_entry(entry: &AuditEntry) -> String {
    let mut line = format!(
        "{}  {:<8} {:<9} {:<24} {}",
        entry.recorded_at.as_datetime().format("%Y-%m-%d %H:%M:%S"),
        entry.actor.as_str(),
        entry.mode.as_str(),
        entry.outcome.as_str(),
        display_course(entry),
    );
    if let Some(updated) = &entry.updated {
        line.push_str(&format!("  -> {}", updated.published.short(12)));
    }
    line
}

fn display_course(entry: &AuditEntry) -> String {
    match &entry.course {
        Some(course) => course.to_string(),
        None if entry.course_text.trim().is_empty() => "(empty)".to_string(),
        None => format!("{:?}", entry.course_text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{Mode, Outcome};
    use crate::core::types::Actor;

    #[test]
    fn unresolved_course_is_quoted() {
        let mut entry = AuditEntry::new(Actor::new("ops").unwrap(), "edx", Mode::Commit);
        entry.outcome = Outcome::MalformedIdentity;

        let line = format_entry(&entry);
        assert!(line.contains("\"edx\""));
        assert!(line.contains("malformed_identity"));
    }

    #[test]
    fn empty_course_is_marked() {
        let entry = AuditEntry::new(Actor::new("ops").unwrap(), "", Mode::DryRun);
        assert!(format_entry(&entry).contains("(empty)"));
    }
}
