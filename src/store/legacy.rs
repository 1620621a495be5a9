//! store::legacy
//!
//! Backend for courses kept as a single content copy.
//!
//! Legacy courses have no independently movable branch pointers, so every
//! pointer read or move fails with [`StoreError::UnsupportedOperation`].
//! The backend only answers whether it holds a course.
//!
//! # Storage
//!
//! - `<root>/legacy/<digest>.json` - [`LegacyCourseV1`] registration
//!
//! An in-memory registry is available for tests.

use std::collections::HashSet;

use parking_lot::RwLock;

use super::file::{read_record, write_json_atomic};
use super::schema::LegacyCourseV1;
use super::{BackendKind, StoreError, VersionStore};
use crate::core::course_key::CourseKey;
use crate::core::ops::CourseLock;
use crate::core::paths::StorePaths;
use crate::core::types::{Actor, Branch, BranchVersionMap, ContentVersion};

#[derive(Debug)]
enum Registry {
    Files(StorePaths),
    Memory(RwLock<HashSet<CourseKey>>),
}

/// Non-versioned course backend.
#[derive(Debug)]
pub struct LegacyStore {
    registry: Registry,
}

impl LegacyStore {
    /// Open the file-backed registry under `paths`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the registry directory cannot be
    /// created.
    pub fn open(paths: StorePaths) -> Result<Self, StoreError> {
        let dir = paths.legacy_dir();
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        Ok(Self {
            registry: Registry::Files(paths),
        })
    }

    /// Create an in-memory registry holding `courses`.
    pub fn in_memory(courses: impl IntoIterator<Item = CourseKey>) -> Self {
        Self {
            registry: Registry::Memory(RwLock::new(courses.into_iter().collect())),
        }
    }

    /// Register `course` with this backend.
    ///
    /// # Errors
    ///
    /// - [`StoreError::CourseExists`] if already registered
    /// - [`StoreError::Lock`] if the course lock cannot be taken
    /// - [`StoreError::Io`] if the registration cannot be written
    pub fn register(&self, course: &CourseKey, actor: &Actor) -> Result<(), StoreError> {
        match &self.registry {
            Registry::Files(paths) => {
                let _lock = CourseLock::acquire(paths, course)?;
                let path = paths.legacy_course_path(course);
                if path.exists() {
                    return Err(StoreError::CourseExists(course.clone()));
                }
                write_json_atomic(&path, &LegacyCourseV1::new(course.clone(), actor.clone()))
            }
            Registry::Memory(courses) => {
                if !courses.write().insert(course.clone()) {
                    return Err(StoreError::CourseExists(course.clone()));
                }
                Ok(())
            }
        }
    }

    fn holds(&self, course: &CourseKey) -> bool {
        match &self.registry {
            Registry::Files(paths) => {
                let path = paths.legacy_course_path(course);
                match read_record::<LegacyCourseV1>(&path) {
                    Ok(Some(record)) => record.course == *course,
                    Ok(None) => false,
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "unreadable legacy registration");
                        false
                    }
                }
            }
            Registry::Memory(courses) => courses.read().contains(course),
        }
    }

    fn refuse(&self, course: &CourseKey) -> StoreError {
        if self.holds(course) {
            StoreError::UnsupportedOperation(course.clone())
        } else {
            StoreError::CourseNotFound(course.clone())
        }
    }
}

impl VersionStore for LegacyStore {
    fn backend_for(&self, course: &CourseKey) -> Option<BackendKind> {
        self.holds(course).then_some(BackendKind::Legacy)
    }

    fn branch_versions(&self, course: &CourseKey) -> Result<BranchVersionMap, StoreError> {
        Err(self.refuse(course))
    }

    fn move_branch_pointer(
        &self,
        course: &CourseKey,
        _branch: Branch,
        _target: &ContentVersion,
        _expected: &BranchVersionMap,
        _actor: &Actor,
    ) -> Result<BranchVersionMap, StoreError> {
        Err(self.refuse(course))
    }
}
