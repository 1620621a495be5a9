//! core::paths
//!
//! Centralized path routing for store locations.
//!
//! **Hard rule:** no code outside this module joins store-relative paths.
//! Every on-disk location goes through `StorePaths`.
//!
//! # Storage Layout
//!
//! All data lives under the store root:
//! - `config.toml` - Store configuration
//! - `active_versions/<digest>.json` - Per-course branch pointer index
//! - `structures/<version>.json` - Immutable content version records
//! - `legacy/<digest>.json` - Courses held by the legacy backend
//! - `locks/<digest>.lock` - Per-course exclusive lock files
//! - `audit/force-publish.jsonl` - Append-only audit log
//!
//! `<digest>` is [`CourseKey::digest`], so arbitrary key text never becomes
//! part of a file name.
//!
//! # Example
//!
//! ```
//! use coursekeeper::core::paths::StorePaths;
//! use std::path::PathBuf;
//!
//! let paths = StorePaths::new(PathBuf::from("/srv/courses"));
//! assert_eq!(
//!     paths.config_path(),
//!     PathBuf::from("/srv/courses/config.toml")
//! );
//! ```

use std::path::{Path, PathBuf};

use crate::core::course_key::CourseKey;
use crate::core::types::ContentVersion;

/// Centralized path routing for store data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    root: PathBuf,
}

impl StorePaths {
    /// Create paths rooted at `root`.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The store root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store configuration file: `<root>/config.toml`.
    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    // =========================================================================
    // Versioned backend
    // =========================================================================

    /// Directory of course indexes.
    pub fn active_versions_dir(&self) -> PathBuf {
        self.root.join("active_versions")
    }

    /// Index file for one course.
    pub fn active_versions_path(&self, course: &CourseKey) -> PathBuf {
        self.active_versions_dir()
            .join(format!("{}.json", course.digest()))
    }

    /// Directory of content version records.
    pub fn structures_dir(&self) -> PathBuf {
        self.root.join("structures")
    }

    /// Record file for one content version.
    pub fn structure_path(&self, version: &ContentVersion) -> PathBuf {
        self.structures_dir()
            .join(format!("{}.json", version.as_str()))
    }

    // =========================================================================
    // Legacy backend
    // =========================================================================

    /// Directory of legacy course registrations.
    pub fn legacy_dir(&self) -> PathBuf {
        self.root.join("legacy")
    }

    /// Registration file for one legacy course.
    pub fn legacy_course_path(&self, course: &CourseKey) -> PathBuf {
        self.legacy_dir().join(format!("{}.json", course.digest()))
    }

    // =========================================================================
    // Locks and audit
    // =========================================================================

    /// Directory of per-course lock files.
    pub fn locks_dir(&self) -> PathBuf {
        self.root.join("locks")
    }

    /// Lock file guarding one course's index.
    pub fn course_lock_path(&self, course: &CourseKey) -> PathBuf {
        self.locks_dir().join(format!("{}.lock", course.digest()))
    }

    /// Directory of audit logs.
    pub fn audit_dir(&self) -> PathBuf {
        self.root.join("audit")
    }

    /// Force-publish audit log.
    pub fn audit_log_path(&self) -> PathBuf {
        self.audit_dir().join("force-publish.jsonl")
    }

    /// Ensure the store directory structure exists.
    ///
    /// # Errors
    ///
    /// Returns an IO error if directory creation fails.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        for dir in [
            self.active_versions_dir(),
            self.structures_dir(),
            self.legacy_dir(),
            self.locks_dir(),
            self.audit_dir(),
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}
