//! versions command - Show a course's branch versions

use crate::cli::context::Context;
use crate::core::types::Branch;
use crate::resolve::BranchResolver;
use crate::store::{StoreError, VersionStore};
use crate::ui::output;
use anyhow::{bail, Context as _, Result};

/// Print both branch pointers of `course`.
pub fn versions(ctx: &Context, course: &str, json: bool) -> Result<()> {
    let config = ctx.config()?;
    let stores = ctx.open_stores(&config)?;

    let course = BranchResolver::new(&stores.mixed)
        .resolve(course)
        .context("Failed to resolve course")?;

    let versions = match stores.mixed.branch_versions(&course) {
        Ok(versions) => versions,
        Err(StoreError::UnsupportedOperation(_)) => {
            bail!("{} is a legacy course and has no branch versions", course)
        }
        Err(e) => return Err(e).context("Failed to read branch versions"),
    };

    if json {
        let value = serde_json::json!({
            "course": course.to_string(),
            "versions": versions,
            "published": versions.is_published(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let verbosity = ctx.verbosity();
    output::print(format!("Course: {}", course), verbosity);
    for branch in Branch::ALL {
        output::print(
            format!("  {:<17} {}", branch.as_str(), versions.get(branch)),
            verbosity,
        );
        output::debug(
            format!("locator: {}", BranchResolver::for_branch(&course, branch)),
            verbosity,
        );
    }
    output::print(
        if versions.is_published() {
            "Published: up to date"
        } else {
            "Published: behind draft"
        },
        verbosity,
    );
    Ok(())
}
