//! audit
//!
//! Append-only record of force-publish invocations.
//!
//! # Modules
//!
//! - [`file`] - JSON-lines log in the store directory
//! - [`memory`] - In-process log
//!
//! # Failure Policy
//!
//! Recording is best effort from the caller's point of view: a failed
//! [`AuditLog::record`] never changes the outcome of the operation that
//! produced the entry. The failure is handed to an [`ErrorSink`] instead.

pub mod file;
pub mod memory;

pub use file::FileAuditLog;
pub use memory::MemoryAuditLog;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::core::course_key::CourseKey;
use crate::core::types::{Actor, BranchVersionMap, UtcTimestamp};

/// Errors from audit logging.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit log i/o error at '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize audit entry: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("corrupt audit entry at line {line}: {message}")]
    Corrupt { line: usize, message: String },
}

/// Requested mode of an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    DryRun,
    Commit,
}

impl Mode {
    /// Mode for a dry-run flag.
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run {
            Mode::DryRun
        } else {
            Mode::Commit
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::DryRun => "dry_run",
            Mode::Commit => "commit",
        }
    }
}

/// Terminal outcome of an invocation, one tag per result and error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    AlreadyPublished,
    DryRun,
    Applied,
    EmptyIdentity,
    MalformedIdentity,
    CourseNotFound,
    UnsupportedBackend,
    ConcurrentModification,
    Backend,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::AlreadyPublished => "already_published",
            Outcome::DryRun => "dry_run",
            Outcome::Applied => "applied",
            Outcome::EmptyIdentity => "empty_identity",
            Outcome::MalformedIdentity => "malformed_identity",
            Outcome::CourseNotFound => "course_not_found",
            Outcome::UnsupportedBackend => "unsupported_backend",
            Outcome::ConcurrentModification => "concurrent_modification",
            Outcome::Backend => "backend",
        }
    }

    /// Whether the invocation ended in a failure.
    pub fn is_failure(&self) -> bool {
        !matches!(
            self,
            Outcome::AlreadyPublished | Outcome::DryRun | Outcome::Applied
        )
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A state the operation passed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Start,
    Resolved,
    Compared,
    AlreadyPublished,
    DryRun,
    Applied,
    Failed,
}

/// One audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditEntry {
    pub id: Uuid,
    pub recorded_at: UtcTimestamp,
    pub actor: Actor,
    /// Course text exactly as supplied.
    pub course_text: String,
    /// Resolved key, if resolution succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<CourseKey>,
    pub mode: Mode,
    pub outcome: Outcome,
    pub message: String,
    /// Snapshot read at comparison time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<BranchVersionMap>,
    /// Snapshot returned by the pointer move.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<BranchVersionMap>,
    /// Failure detail beyond the user-facing message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub stages: Vec<Stage>,
}

impl AuditEntry {
    /// Start an entry for an invocation with a fresh id and timestamp.
    pub fn new(actor: Actor, course_text: impl Into<String>, mode: Mode) -> Self {
        Self {
            id: Uuid::new_v4(),
            recorded_at: UtcTimestamp::now(),
            actor,
            course_text: course_text.into(),
            course: None,
            mode,
            outcome: Outcome::Backend,
            message: String::new(),
            current: None,
            updated: None,
            detail: None,
            stages: vec![Stage::Start],
        }
    }
}

/// Append-only sink of audit entries.
pub trait AuditLog: Send + Sync {
    /// Append `entry`.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError`] if the entry could not be made durable.
    fn record(&self, entry: &AuditEntry) -> Result<(), AuditError>;
}

/// Audit log that keeps nothing, for stores with auditing disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledAuditLog;

impl AuditLog for DisabledAuditLog {
    fn record(&self, _entry: &AuditEntry) -> Result<(), AuditError> {
        Ok(())
    }
}

/// Receives audit failures for operational follow-up.
pub trait ErrorSink: Send + Sync {
    fn report(&self, error: &AuditError, entry: &AuditEntry);
}

/// Reports audit failures as `tracing` errors.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn report(&self, error: &AuditError, entry: &AuditEntry) {
        tracing::error!(
            entry = %entry.id,
            actor = %entry.actor,
            course = %entry.course_text,
            outcome = %entry.outcome,
            error = %error,
            "failed to record audit entry"
        );
    }
}
