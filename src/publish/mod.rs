//! publish
//!
//! The force-publish operation: point a course's published branch at its
//! draft version.
//!
//! # State Machine
//!
//! ```text
//! Start -> Resolved -> (capability check) -> Compared
//!       -> AlreadyPublished | DryRun | Applied | Failed
//! ```
//!
//! 1. Resolve the course text. Empty, malformed and unknown keys fail here.
//! 2. Refuse courses whose backend cannot move branch pointers.
//! 3. Read both pointers. Equal pointers end in `AlreadyPublished`, so
//!    repeating a successful invocation is a no-op. This is checked before
//!    the dry-run flag.
//! 4. Dry runs stop with the snapshot unchanged.
//! 5. Otherwise move the published pointer to the draft version, using the
//!    compared snapshot as the expectation. A store that moved in between
//!    fails with `ConcurrentModification`; callers retry the whole
//!    operation.
//!
//! Only step 5 mutates state. Every invocation, whatever its outcome,
//! appends exactly one audit entry.
//!
//! # Example
//!
//! ```
//! use coursekeeper::audit::MemoryAuditLog;
//! use coursekeeper::core::types::Actor;
//! use coursekeeper::publish::{ForcePublish, ForcePublishRequest, ForcePublishResult};
//! use coursekeeper::store::{DraftAuthoring, MemoryStore};
//!
//! let store = MemoryStore::new();
//! let audit = MemoryAuditLog::new();
//! let staff = Actor::new("staff").unwrap();
//!
//! let course = "course-v1:e+d+X".parse().unwrap();
//! store.create_course(&course, &staff).unwrap();
//! store.stage_draft(&course, b"new unit", &staff).unwrap();
//!
//! let op = ForcePublish::new(&store, &audit);
//! let result = op.run(&ForcePublishRequest::new("course-v1:e+d+X", false, staff.clone()));
//! assert!(matches!(result, ForcePublishResult::Applied { .. }));
//!
//! let again = op.run(&ForcePublishRequest::new("course-v1:e+d+X", false, staff));
//! assert!(matches!(again, ForcePublishResult::AlreadyPublished { .. }));
//! assert_eq!(audit.len(), 2);
//! ```

pub mod result;

pub use result::{messages, ForcePublishError, ForcePublishResult};

use crate::audit::{AuditEntry, AuditLog, ErrorSink, Mode, Stage, TracingErrorSink};
use crate::core::types::{Actor, Branch};
use crate::resolve::BranchResolver;
use crate::store::{StoreError, VersionStore};

/// Inputs of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForcePublishRequest {
    /// Course identity as typed by the operator.
    pub course_text: String,
    pub dry_run: bool,
    pub actor: Actor,
}

impl ForcePublishRequest {
    pub fn new(course_text: impl Into<String>, dry_run: bool, actor: Actor) -> Self {
        Self {
            course_text: course_text.into(),
            dry_run,
            actor,
        }
    }
}

/// Force-publish over a store, recording to an audit log.
#[derive(Clone, Copy)]
pub struct ForcePublish<'a> {
    store: &'a dyn VersionStore,
    audit: &'a dyn AuditLog,
    errors: &'a dyn ErrorSink,
}

impl<'a> ForcePublish<'a> {
    /// Audit failures go to [`TracingErrorSink`].
    pub fn new(store: &'a dyn VersionStore, audit: &'a dyn AuditLog) -> Self {
        Self {
            store,
            audit,
            errors: &TracingErrorSink,
        }
    }

    /// Send audit failures to `errors` instead.
    pub fn with_error_sink(mut self, errors: &'a dyn ErrorSink) -> Self {
        self.errors = errors;
        self
    }

    /// Run one invocation. Never panics or returns a bare error: every
    /// failure is a [`ForcePublishResult::Failed`].
    pub fn run(&self, request: &ForcePublishRequest) -> ForcePublishResult {
        let mut entry = AuditEntry::new(
            request.actor.clone(),
            request.course_text.as_str(),
            Mode::from_dry_run(request.dry_run),
        );

        let result = self
            .execute(request, &mut entry)
            .unwrap_or_else(ForcePublishResult::Failed);

        entry.outcome = result.outcome();
        entry.message = result.message().to_string();
        entry.detail = result.error().map(ToString::to_string);
        entry.stages.push(match &result {
            ForcePublishResult::AlreadyPublished { .. } => Stage::AlreadyPublished,
            ForcePublishResult::DryRun { .. } => Stage::DryRun,
            ForcePublishResult::Applied { .. } => Stage::Applied,
            ForcePublishResult::Failed(_) => Stage::Failed,
        });

        log_outcome(request, &result);

        if let Err(err) = self.audit.record(&entry) {
            self.errors.report(&err, &entry);
        }
        result
    }

    fn execute(
        &self,
        request: &ForcePublishRequest,
        entry: &mut AuditEntry,
    ) -> Result<ForcePublishResult, ForcePublishError> {
        let course = BranchResolver::new(self.store).resolve(&request.course_text)?;
        entry.course = Some(course.clone());
        entry.stages.push(Stage::Resolved);
        tracing::debug!(course = %course, "resolved course");

        if !self.store.supports_branch_pointer_update(&course) {
            return Err(ForcePublishError::UnsupportedBackend(course));
        }

        let current = self.store.branch_versions(&course)?;
        entry.current = Some(current.clone());
        entry.stages.push(Stage::Compared);
        tracing::debug!(course = %course, versions = %current, "compared branches");

        if current.is_published() {
            return Ok(ForcePublishResult::AlreadyPublished { current });
        }
        if request.dry_run {
            return Ok(ForcePublishResult::DryRun { current });
        }

        let updated = match self.store.move_branch_pointer(
            &course,
            Branch::Published,
            &current.draft,
            &current,
            &request.actor,
        ) {
            Ok(updated) => updated,
            // The draft version existed when compared; losing it before the
            // move is a race like any other pointer change.
            Err(StoreError::VersionNotFound(version)) => {
                tracing::debug!(course = %course, version = %version, "target vanished before move");
                let actual = self
                    .store
                    .branch_versions(&course)
                    .unwrap_or_else(|_| current.clone());
                return Err(ForcePublishError::ConcurrentModification {
                    expected: current,
                    actual,
                });
            }
            Err(err) => return Err(err.into()),
        };
        entry.updated = Some(updated.clone());

        if updated.draft != current.draft || updated.published != current.draft {
            return Err(ForcePublishError::Backend(format!(
                "pointer move on {} left {}, expected both branches at {}",
                BranchResolver::for_branch(&course, Branch::Published),
                updated,
                current.draft
            )));
        }

        Ok(ForcePublishResult::Applied {
            previous: current,
            updated,
        })
    }
}

fn log_outcome(request: &ForcePublishRequest, result: &ForcePublishResult) {
    let actor = request.actor.as_str();
    let course = request.course_text.trim();
    match result {
        ForcePublishResult::Applied { previous, updated } => tracing::info!(
            actor,
            course,
            "Published branch version changed from {} to {}.",
            previous.published,
            updated.published
        ),
        ForcePublishResult::DryRun { current } => tracing::info!(
            actor,
            course,
            "Dry run: published branch would change from {} to {}.",
            current.published,
            current.draft
        ),
        ForcePublishResult::AlreadyPublished { .. } => {
            tracing::info!(actor, course, "Course is already in published state.")
        }
        ForcePublishResult::Failed(err) => tracing::info!(
            actor,
            course,
            outcome = %err.outcome(),
            error = %err,
            "Force publish failed."
        ),
    }
}
