//! store::file
//!
//! Versioned store on the local filesystem.
//!
//! # Storage Layout
//!
//! - `<root>/active_versions/<digest>.json` - [`CourseIndexV1`], one per course
//! - `<root>/structures/<version>.json` - [`StructureV1`], immutable
//! - `<root>/locks/<digest>.lock` - [`CourseLock`] file
//!
//! # Write Protocol
//!
//! Index writes hold the course lock and go through a uniquely named temp
//! file that is fsynced and renamed into place. Readers see either the old
//! index or the new one, never a partial write. Structure records are
//! content-addressed and written once.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use serde::Serialize;

use super::schema::{parse_record, CourseIndexV1, Record, StructureV1};
use super::{initial_version, BackendKind, DraftAuthoring, StoreError, VersionStore};
use crate::core::course_key::CourseKey;
use crate::core::ops::CourseLock;
use crate::core::paths::StorePaths;
use crate::core::types::{Actor, Branch, BranchVersionMap, ContentVersion};

/// Filesystem-backed versioned store.
///
/// Safe to share across threads and across processes pointed at the same
/// root: every mutation is serialized by the per-course file lock.
#[derive(Debug, Clone)]
pub struct FileStore {
    paths: StorePaths,
}

impl FileStore {
    /// Open the store at `paths`, creating its directories if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directories cannot be created.
    pub fn open(paths: StorePaths) -> Result<Self, StoreError> {
        paths
            .ensure_dirs()
            .map_err(|e| StoreError::io(paths.root(), e))?;
        Ok(Self { paths })
    }

    /// Store layout.
    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    /// Read a course index, `None` if the course is not registered.
    fn read_index(&self, course: &CourseKey) -> Result<Option<CourseIndexV1>, StoreError> {
        let path = self.paths.active_versions_path(course);
        let Some(index) = read_record::<CourseIndexV1>(&path)? else {
            return Ok(None);
        };

        if index.course != *course {
            return Err(StoreError::Corrupt {
                path,
                message: format!("index belongs to {}, expected {}", index.course, course),
            });
        }
        Ok(Some(index))
    }

    fn require_index(&self, course: &CourseKey) -> Result<CourseIndexV1, StoreError> {
        self.read_index(course)?
            .ok_or_else(|| StoreError::CourseNotFound(course.clone()))
    }

    /// Read a version's record, checking it belongs to `course`.
    fn read_structure(
        &self,
        course: &CourseKey,
        version: &ContentVersion,
    ) -> Result<Option<StructureV1>, StoreError> {
        let path = self.paths.structure_path(version);
        let Some(structure) = read_record::<StructureV1>(&path)? else {
            return Ok(None);
        };

        if structure.version != *version {
            return Err(StoreError::Corrupt {
                path,
                message: format!("record describes {}, expected {}", structure.version, version),
            });
        }
        // A version of another course is not a valid target for this one.
        if structure.course != *course {
            return Ok(None);
        }
        Ok(Some(structure))
    }

    fn write_structure(&self, structure: &StructureV1) -> Result<(), StoreError> {
        let path = self.paths.structure_path(&structure.version);
        if path.exists() {
            return Ok(());
        }
        write_json_atomic(&path, structure)
    }
}

impl VersionStore for FileStore {
    fn backend_for(&self, course: &CourseKey) -> Option<BackendKind> {
        self.paths
            .active_versions_path(course)
            .is_file()
            .then_some(BackendKind::Versioned)
    }

    fn branch_versions(&self, course: &CourseKey) -> Result<BranchVersionMap, StoreError> {
        Ok(self.require_index(course)?.versions)
    }

    fn move_branch_pointer(
        &self,
        course: &CourseKey,
        branch: Branch,
        target: &ContentVersion,
        expected: &BranchVersionMap,
        actor: &Actor,
    ) -> Result<BranchVersionMap, StoreError> {
        let _lock = CourseLock::acquire(&self.paths, course)?;

        let index = self.require_index(course)?;
        if index.versions != *expected {
            return Err(StoreError::ConcurrentModification {
                course: course.clone(),
                expected: expected.clone(),
                actual: index.versions,
            });
        }

        if self.read_structure(course, target)?.is_none() {
            return Err(StoreError::VersionNotFound(target.clone()));
        }

        let updated = index.versions.with(branch, target.clone());
        let next = CourseIndexV1::new(course.clone(), updated.clone(), actor.clone());
        write_json_atomic(&self.paths.active_versions_path(course), &next)?;

        tracing::debug!(
            course = %course,
            branch = %branch,
            from = %index.versions.get(branch),
            to = %target,
            "moved branch pointer"
        );
        Ok(updated)
    }
}

impl DraftAuthoring for FileStore {
    fn create_course(
        &self,
        course: &CourseKey,
        actor: &Actor,
    ) -> Result<BranchVersionMap, StoreError> {
        let _lock = CourseLock::acquire(&self.paths, course)?;

        if self.read_index(course)?.is_some() {
            return Err(StoreError::CourseExists(course.clone()));
        }

        let version = initial_version(course);
        self.write_structure(&StructureV1::new(
            version.clone(),
            course.clone(),
            None,
            actor.clone(),
        ))?;

        let versions = BranchVersionMap::new(version.clone(), version);
        let index = CourseIndexV1::new(course.clone(), versions.clone(), actor.clone());
        write_json_atomic(&self.paths.active_versions_path(course), &index)?;

        tracing::debug!(course = %course, "registered course");
        Ok(versions)
    }

    fn stage_draft(
        &self,
        course: &CourseKey,
        content: &[u8],
        actor: &Actor,
    ) -> Result<BranchVersionMap, StoreError> {
        let _lock = CourseLock::acquire(&self.paths, course)?;

        let index = self.require_index(course)?;
        let parent = index.versions.draft.clone();
        let version = ContentVersion::derive(Some(&parent), content);

        self.write_structure(&StructureV1::new(
            version.clone(),
            course.clone(),
            Some(parent),
            actor.clone(),
        ))?;

        let updated = index.versions.with(Branch::Draft, version);
        let next = CourseIndexV1::new(course.clone(), updated.clone(), actor.clone());
        write_json_atomic(&self.paths.active_versions_path(course), &next)?;

        tracing::debug!(course = %course, draft = %updated.draft, "staged draft");
        Ok(updated)
    }
}

/// Read and parse a record, `None` if the file does not exist.
pub(crate) fn read_record<T: Record>(path: &Path) -> Result<Option<T>, StoreError> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::io(path, e)),
    };

    parse_record(&json)
        .map(Some)
        .map_err(|e| StoreError::corrupt(path, e))
}

/// Write `value` as pretty JSON via temp file, fsync, and rename.
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }

    // Unique per writer so concurrent writers of the same record never
    // share a temp file.
    let temp_path = path.with_extension(format!("json.{}.tmp", uuid::Uuid::new_v4().simple()));

    let mut file = fs::File::create(&temp_path).map_err(|e| StoreError::io(&temp_path, e))?;
    file.write_all(json.as_bytes())
        .map_err(|e| StoreError::io(&temp_path, e))?;
    file.sync_all().map_err(|e| StoreError::io(&temp_path, e))?;
    drop(file);

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(StoreError::io(path, e));
    }
    Ok(())
}
