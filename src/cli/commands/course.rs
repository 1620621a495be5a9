//! course command - Register courses and stage draft content

use crate::cli::context::Context;
use crate::core::course_key::CourseKey;
use crate::store::{DraftAuthoring, VersionStore};
use crate::ui::output;
use anyhow::{bail, Context as _, Result};

/// Register `course` in the versioned backend, or the legacy one.
pub fn create(ctx: &Context, course: &str, legacy: bool, actor: Option<&str>) -> Result<()> {
    let verbosity = ctx.verbosity();
    let config = ctx.config()?;
    let actor = ctx.actor(actor, &config)?;
    let stores = ctx.open_stores(&config)?;

    let course = CourseKey::parse(course).context("Invalid course key")?;
    if let Some(backend) = stores.mixed.backend_for(&course) {
        bail!("Course {} already exists in the {} backend", course, backend);
    }

    if legacy {
        stores
            .legacy
            .register(&course, &actor)
            .context("Failed to register legacy course")?;
        output::success(format!("Registered legacy course {}", course), verbosity);
        return Ok(());
    }

    let versions = stores
        .versioned
        .create_course(&course, &actor)
        .context("Failed to create course")?;
    output::success(format!("Created course {}", course), verbosity);
    output::print(format!("  version {}", versions.draft), verbosity);
    Ok(())
}

/// Stage `content` as the new draft of `course`.
pub fn stage(ctx: &Context, course: &str, content: &str, actor: Option<&str>) -> Result<()> {
    let verbosity = ctx.verbosity();
    let config = ctx.config()?;
    let actor = ctx.actor(actor, &config)?;
    let stores = ctx.open_stores(&config)?;

    let course = CourseKey::parse(course).context("Invalid course key")?;
    if stores.legacy.has_course(&course) {
        bail!("{} is a legacy course and has no draft branch", course);
    }

    let versions = stores
        .versioned
        .stage_draft(&course, content.as_bytes(), &actor)
        .context("Failed to stage draft")?;
    output::success(format!("Staged draft {}", versions.draft), verbosity);
    output::debug(format!("branches now {}", versions), verbosity);
    Ok(())
}
