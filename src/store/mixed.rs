//! store::mixed
//!
//! Routes each course to the backend that holds it.
//!
//! Backends are consulted in registration order and the first one holding
//! the course answers every call for it. A course unknown to all backends
//! gets [`StoreError::CourseNotFound`].

use std::sync::Arc;

use super::{BackendKind, StoreError, VersionStore};
use crate::core::course_key::CourseKey;
use crate::core::types::{Actor, Branch, BranchVersionMap, ContentVersion};

/// Router over several backends.
#[derive(Default, Clone)]
pub struct MixedStore {
    backends: Vec<Arc<dyn VersionStore>>,
}

impl MixedStore {
    /// Create a router with no backends.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a backend; earlier backends win for courses held by both.
    pub fn with_backend(mut self, backend: Arc<dyn VersionStore>) -> Self {
        self.backends.push(backend);
        self
    }

    fn route(&self, course: &CourseKey) -> Result<&dyn VersionStore, StoreError> {
        self.backends
            .iter()
            .find(|b| b.has_course(course))
            .map(|b| b.as_ref())
            .ok_or_else(|| StoreError::CourseNotFound(course.clone()))
    }
}

impl std::fmt::Debug for MixedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MixedStore")
            .field("backends", &self.backends.len())
            .finish()
    }
}

impl VersionStore for MixedStore {
    fn backend_for(&self, course: &CourseKey) -> Option<BackendKind> {
        self.backends.iter().find_map(|b| b.backend_for(course))
    }

    fn branch_versions(&self, course: &CourseKey) -> Result<BranchVersionMap, StoreError> {
        self.route(course)?.branch_versions(course)
    }

    fn move_branch_pointer(
        &self,
        course: &CourseKey,
        branch: Branch,
        target: &ContentVersion,
        expected: &BranchVersionMap,
        actor: &Actor,
    ) -> Result<BranchVersionMap, StoreError> {
        self.route(course)?
            .move_branch_pointer(course, branch, target, expected, actor)
    }
}
