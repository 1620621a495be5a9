//! store::memory
//!
//! Versioned store held in process memory.
//!
//! Every operation takes one mutex, so the expectation check and the pointer
//! move are a single critical section. Used by tests and by embedders that
//! supply their own persistence.

use std::collections::HashMap;

use parking_lot::Mutex;

use super::{initial_version, BackendKind, DraftAuthoring, StoreError, VersionStore};
use crate::core::course_key::CourseKey;
use crate::core::types::{Actor, Branch, BranchVersionMap, ContentVersion};

#[derive(Debug, Default)]
struct State {
    courses: HashMap<CourseKey, BranchVersionMap>,
    /// Known versions and the course each belongs to.
    versions: HashMap<ContentVersion, CourseKey>,
}

/// In-memory versioned store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a course with explicit pointers.
    ///
    /// Both versions are recorded as belonging to the course. Replaces any
    /// existing registration.
    pub fn insert_course(&self, course: CourseKey, versions: BranchVersionMap) {
        let mut state = self.state.lock();
        for version in [&versions.draft, &versions.published] {
            state.versions.insert(version.clone(), course.clone());
        }
        state.courses.insert(course, versions);
    }

    /// Drop the record of `version`, as a structure pruning job would.
    ///
    /// Pointers already referencing it are left untouched.
    pub fn forget_version(&self, version: &ContentVersion) -> bool {
        self.state.lock().versions.remove(version).is_some()
    }
}

impl VersionStore for MemoryStore {
    fn backend_for(&self, course: &CourseKey) -> Option<BackendKind> {
        self.state
            .lock()
            .courses
            .contains_key(course)
            .then_some(BackendKind::Versioned)
    }

    fn branch_versions(&self, course: &CourseKey) -> Result<BranchVersionMap, StoreError> {
        self.state
            .lock()
            .courses
            .get(course)
            .cloned()
            .ok_or_else(|| StoreError::CourseNotFound(course.clone()))
    }

    fn move_branch_pointer(
        &self,
        course: &CourseKey,
        branch: Branch,
        target: &ContentVersion,
        expected: &BranchVersionMap,
        _actor: &Actor,
    ) -> Result<BranchVersionMap, StoreError> {
        let mut state = self.state.lock();

        let current = state
            .courses
            .get(course)
            .cloned()
            .ok_or_else(|| StoreError::CourseNotFound(course.clone()))?;
        if current != *expected {
            return Err(StoreError::ConcurrentModification {
                course: course.clone(),
                expected: expected.clone(),
                actual: current,
            });
        }

        if state.versions.get(target) != Some(course) {
            return Err(StoreError::VersionNotFound(target.clone()));
        }

        let updated = current.with(branch, target.clone());
        state.courses.insert(course.clone(), updated.clone());
        Ok(updated)
    }
}

impl DraftAuthoring for MemoryStore {
    fn create_course(
        &self,
        course: &CourseKey,
        _actor: &Actor,
    ) -> Result<BranchVersionMap, StoreError> {
        let mut state = self.state.lock();
        if state.courses.contains_key(course) {
            return Err(StoreError::CourseExists(course.clone()));
        }

        let version = initial_version(course);
        state.versions.insert(version.clone(), course.clone());
        let versions = BranchVersionMap::new(version.clone(), version);
        state.courses.insert(course.clone(), versions.clone());
        Ok(versions)
    }

    fn stage_draft(
        &self,
        course: &CourseKey,
        content: &[u8],
        _actor: &Actor,
    ) -> Result<BranchVersionMap, StoreError> {
        let mut state = self.state.lock();
        let current = state
            .courses
            .get(course)
            .cloned()
            .ok_or_else(|| StoreError::CourseNotFound(course.clone()))?;

        let version = ContentVersion::derive(Some(&current.draft), content);
        state.versions.insert(version.clone(), course.clone());
        let updated = current.with(Branch::Draft, version);
        state.courses.insert(course.clone(), updated.clone());
        Ok(updated)
    }
}
