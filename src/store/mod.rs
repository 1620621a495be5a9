//! store
//!
//! Versioned branch-pointer storage.
//!
//! # Modules
//!
//! - [`schema`] - On-disk record schemas
//! - [`file`] - Versioned store on the local filesystem
//! - [`memory`] - Versioned store held in process memory
//! - [`legacy`] - Non-versioned backend that cannot move branch pointers
//! - [`mixed`] - Router that picks the backend owning each course
//!
//! # Architecture
//!
//! Every backend implements [`VersionStore`]. Whether a course's branch
//! pointers can be moved is an explicit capability
//! ([`VersionStore::supports_branch_pointer_update`]), not a property
//! inferred from the backend's type at the call site.
//!
//! # CAS Semantics
//!
//! [`VersionStore::move_branch_pointer`] takes the snapshot the caller
//! compared against. The backend re-checks it under its per-course
//! exclusion and fails with [`StoreError::ConcurrentModification`] if the
//! pointers moved in between, so a stale comparison can never be applied.

pub mod file;
pub mod legacy;
pub mod memory;
pub mod mixed;
pub mod schema;

pub use file::FileStore;
pub use legacy::LegacyStore;
pub use memory::MemoryStore;
pub use mixed::MixedStore;

use std::path::PathBuf;

use thiserror::Error;

use crate::core::course_key::CourseKey;
use crate::core::ops::LockError;
use crate::core::types::{Actor, Branch, BranchVersionMap, ContentVersion};
use schema::SchemaError;

/// Which kind of backend holds a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Branch pointers are independently movable.
    Versioned,
    /// Single content copy; no movable branch pointers.
    Legacy,
}

impl BackendKind {
    /// Short name for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Versioned => "versioned",
            BackendKind::Legacy => "legacy",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No backend holds the course.
    #[error("course not found: {0}")]
    CourseNotFound(CourseKey),

    /// The course is already registered.
    #[error("course already exists: {0}")]
    CourseExists(CourseKey),

    /// The target content version has no record.
    #[error("content version not found: {0}")]
    VersionNotFound(ContentVersion),

    /// The course's backend cannot move branch pointers.
    #[error("branch pointer update is not supported for {0}")]
    UnsupportedOperation(CourseKey),

    /// The pointers changed since the caller's snapshot was taken.
    #[error("branch pointers of {course} changed: expected {expected}, found {actual}")]
    ConcurrentModification {
        course: CourseKey,
        expected: BranchVersionMap,
        actual: BranchVersionMap,
    },

    /// A stored record failed to parse or does not match its location.
    #[error("corrupt record '{path}': {message}")]
    Corrupt { path: PathBuf, message: String },

    /// Filesystem failure.
    #[error("store i/o error at '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to serialize a record.
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Failed to take the course lock.
    #[error("course lock error: {0}")]
    Lock(#[from] LockError),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, err: SchemaError) -> Self {
        StoreError::Corrupt {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Branch-pointer store contract.
///
/// Reads are free and concurrent. The only mutation is
/// [`move_branch_pointer`](Self::move_branch_pointer), which is atomic per
/// course.
pub trait VersionStore: Send + Sync {
    /// Which backend holds `course`, or `None` if no backend does.
    fn backend_for(&self, course: &CourseKey) -> Option<BackendKind>;

    /// Existence check; never fails.
    fn has_course(&self, course: &CourseKey) -> bool {
        self.backend_for(course).is_some()
    }

    /// Capability probe: can this course's branch pointers move
    /// independently?
    fn supports_branch_pointer_update(&self, course: &CourseKey) -> bool {
        self.backend_for(course) == Some(BackendKind::Versioned)
    }

    /// Read a fresh snapshot of both branch pointers.
    ///
    /// # Errors
    ///
    /// - [`StoreError::CourseNotFound`] if no backend holds the course
    /// - [`StoreError::UnsupportedOperation`] for legacy courses
    fn branch_versions(&self, course: &CourseKey) -> Result<BranchVersionMap, StoreError>;

    /// Atomically repoint `branch` to `target` and return the new snapshot.
    ///
    /// Applies only if the current pointers still equal `expected`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::UnsupportedOperation`] for legacy courses
    /// - [`StoreError::CourseNotFound`] if no backend holds the course
    /// - [`StoreError::ConcurrentModification`] if the pointers moved since
    ///   `expected` was read
    /// - [`StoreError::VersionNotFound`] if `target` has no record
    fn move_branch_pointer(
        &self,
        course: &CourseKey,
        branch: Branch,
        target: &ContentVersion,
        expected: &BranchVersionMap,
        actor: &Actor,
    ) -> Result<BranchVersionMap, StoreError>;
}

/// Fixture-level authoring for versioned backends.
///
/// Registers courses and stages draft content so the states force-publish
/// acts on can be built. Never touches the published pointer.
pub trait DraftAuthoring {
    /// Register a new course whose branches share an initial version.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CourseExists`] if the course is registered.
    fn create_course(&self, course: &CourseKey, actor: &Actor)
        -> Result<BranchVersionMap, StoreError>;

    /// Record `content` as a new version and move the draft pointer to it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CourseNotFound`] for unknown courses.
    fn stage_draft(
        &self,
        course: &CourseKey,
        content: &[u8],
        actor: &Actor,
    ) -> Result<BranchVersionMap, StoreError>;
}

/// Version a new course starts from.
///
/// Derived from the course key alone so re-creating a course after removal
/// lands on the same initial version.
pub(crate) fn initial_version(course: &CourseKey) -> ContentVersion {
    ContentVersion::derive(None, course.to_string().as_bytes())
}
