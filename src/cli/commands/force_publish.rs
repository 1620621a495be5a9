//! force-publish command - Point the published branch at the draft version

use crate::access::{Authorizer, StaffList, STAFF_REQUIRED};
use crate::audit::{AuditLog, DisabledAuditLog, FileAuditLog};
use crate::cli::context::Context;
use crate::publish::{ForcePublish, ForcePublishRequest, ForcePublishResult};
use crate::ui::output;
use anyhow::{bail, Result};

/// Run force-publish for `course` as a staff actor.
///
/// Exits non-zero only when the operation fails; "already published" is
/// a successful outcome.
pub fn force_publish(
    ctx: &Context,
    course: &str,
    dry_run: bool,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    let verbosity = ctx.verbosity();
    let config = ctx.config()?;
    let actor = ctx.actor(actor, &config)?;

    let staff = StaffList::new(config.staff().iter().cloned());
    if !staff.is_staff(&actor) {
        bail!(STAFF_REQUIRED);
    }

    let stores = ctx.open_stores(&config)?;
    let audit: Box<dyn AuditLog> = if config.audit_enabled() {
        Box::new(FileAuditLog::new(&stores.paths))
    } else {
        output::debug("Audit log disabled by store config", verbosity);
        Box::new(DisabledAuditLog)
    };

    let request = ForcePublishRequest::new(course, dry_run, actor);
    let result = ForcePublish::new(&stores.mixed, audit.as_ref()).run(&request);

    if json {
        println!("{}", serde_json::to_string_pretty(&result_json(&request, &result))?);
    } else {
        print_result(&result, verbosity);
    }

    match result.error() {
        None => Ok(()),
        Some(err) => {
            output::debug(err, verbosity);
            if err.is_retryable() {
                output::warn(
                    "The course changed while publishing; run the command again to retry",
                    verbosity,
                );
            }
            bail!(result.message())
        }
    }
}

fn print_result(result: &ForcePublishResult, verbosity: output::Verbosity) {
    match result {
        ForcePublishResult::DryRun { current } => {
            output::print(
                format!(
                    "Published branch would change from {} to {}.",
                    current.published, current.draft
                ),
                verbosity,
            );
            output::success(result.message(), verbosity);
        }
        ForcePublishResult::Applied { previous, updated } => {
            output::print(
                format!(
                    "Published branch version changed from {} to {}.",
                    previous.published, updated.published
                ),
                verbosity,
            );
            output::success(result.message(), verbosity);
        }
        ForcePublishResult::AlreadyPublished { .. } => {
            output::success(result.message(), verbosity);
        }
        // Reported by the caller through the returned error.
        ForcePublishResult::Failed(_) => {}
    }
}

fn result_json(request: &ForcePublishRequest, result: &ForcePublishResult) -> serde_json::Value {
    let mut value = serde_json::json!({
        "course": request.course_text,
        "dry_run": request.dry_run,
        "actor": request.actor,
        "outcome": result.outcome(),
        "message": result.message(),
    });

    match result {
        ForcePublishResult::AlreadyPublished { current } | ForcePublishResult::DryRun { current } => {
            value["current"] = serde_json::json!(current);
        }
        ForcePublishResult::Applied { previous, updated } => {
            value["previous"] = serde_json::json!(previous);
            value["updated"] = serde_json::json!(updated);
        }
        ForcePublishResult::Failed(err) => {
            value["error"] = serde_json::json!(err.to_string());
            value["retryable"] = serde_json::json!(err.is_retryable());
        }
    }
    value
}
