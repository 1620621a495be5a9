//! audit::file
//!
//! JSON-lines audit log at `<root>/audit/force-publish.jsonl`.
//!
//! Each entry is one line, appended under an exclusive file lock and synced
//! before [`AuditLog::record`] returns. Processes sharing a store interleave
//! whole lines only.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use super::{AuditEntry, AuditError, AuditLog};
use crate::core::paths::StorePaths;

/// Audit log file in a store directory.
#[derive(Debug, Clone)]
pub struct FileAuditLog {
    path: PathBuf,
}

impl FileAuditLog {
    /// Log under the store at `paths`. The file is created on first write.
    pub fn new(paths: &StorePaths) -> Self {
        Self::at(paths.audit_log_path())
    }

    /// Log at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> AuditError {
        AuditError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Read every entry, oldest first. A missing file is an empty log.
    ///
    /// # Errors
    ///
    /// - [`AuditError::Io`] if the file cannot be read
    /// - [`AuditError::Corrupt`] naming the first unparseable line
    pub fn read_all(&self) -> Result<Vec<AuditEntry>, AuditError> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        let mut entries = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| self.io_error(e))?;
            if line.trim().is_empty() {
                continue;
            }
            let entry = serde_json::from_str(&line).map_err(|e| AuditError::Corrupt {
                line: index + 1,
                message: e.to_string(),
            })?;
            entries.push(entry);
        }
        Ok(entries)
    }

    /// The newest `limit` entries, oldest first.
    pub fn read_recent(&self, limit: usize) -> Result<Vec<AuditEntry>, AuditError> {
        let mut entries = self.read_all()?;
        let skip = entries.len().saturating_sub(limit);
        Ok(entries.split_off(skip))
    }
}

impl AuditLog for FileAuditLog {
    fn record(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;

        file.lock_exclusive().map_err(|e| self.io_error(e))?;
        let written = file
            .write_all(line.as_bytes())
            .and_then(|()| file.sync_data());
        let unlocked = FileExt::unlock(&file);

        written.map_err(|e| self.io_error(e))?;
        unlocked.map_err(|e| self.io_error(e))
    }
}
