//! core::ops::lock
//!
//! Exclusive per-course lock for store mutations.
//!
//! # Architecture
//!
//! The course lock serializes every read-check-write of one course's
//! records across threads and processes. It is course-scoped: updates to
//! different courses never contend. The versioned index and the legacy
//! registration of a course share the same lock.
//!
//! # Storage
//!
//! - `<root>/locks/<digest>.lock` - Lock file with OS-level exclusive lock
//!
//! # Invariants
//!
//! - Lock must be held from the existence or expectation check through the
//!   final rename
//! - Lock is automatically released on drop (RAII pattern)
//!
//! # Example
//!
//! ```ignore
//! use coursekeeper::core::ops::lock::CourseLock;
//!
//! let lock = CourseLock::acquire(&paths, &course)?;
//! // ... check expectation and write the index ...
//! drop(lock);
//! ```

use std::fs::{self, File, OpenOptions};

use fs2::FileExt;
use thiserror::Error;

use crate::core::course_key::CourseKey;
use crate::core::paths::StorePaths;

/// Errors from locking operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// Failed to create lock file or directory.
    #[error("failed to create lock: {0}")]
    CreateFailed(String),

    /// Failed to acquire the OS lock.
    #[error("failed to acquire lock: {0}")]
    AcquireFailed(String),
}

/// An exclusive lock on one course's records.
///
/// Released when dropped, even if the holder panics.
#[derive(Debug)]
pub struct CourseLock {
    file: File,
}

impl CourseLock {
    /// Acquire the lock for `course`, waiting for any current holder.
    ///
    /// Uses OS-level file locking via `fs2`, which excludes other processes
    /// and other handles in this process alike.
    ///
    /// # Errors
    ///
    /// - [`LockError::CreateFailed`] if the lock file cannot be created
    /// - [`LockError::AcquireFailed`] if the OS lock cannot be acquired
    pub fn acquire(paths: &StorePaths, course: &CourseKey) -> Result<Self, LockError> {
        let dir = paths.locks_dir();
        fs::create_dir_all(&dir).map_err(|e| {
            LockError::CreateFailed(format!("cannot create {}: {}", dir.display(), e))
        })?;

        let path = paths.course_lock_path(course);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| {
                LockError::CreateFailed(format!("cannot open {}: {}", path.display(), e))
            })?;

        file.lock_exclusive()
            .map_err(|e| LockError::AcquireFailed(e.to_string()))?;
        Ok(Self { file })
    }
}

impl Drop for CourseLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    fn course(text: &str) -> CourseKey {
        CourseKey::parse(text).unwrap()
    }

    /// Acquire on another thread; report whether it got through in `wait`.
    fn acquires_within(paths: &StorePaths, key: &CourseKey, wait: Duration) -> bool {
        let (tx, rx) = mpsc::channel();
        let paths = paths.clone();
        let key = key.clone();
        thread::spawn(move || {
            let lock = CourseLock::acquire(&paths, &key).unwrap();
            let _ = tx.send(());
            drop(lock);
        });
        rx.recv_timeout(wait).is_ok()
    }

    #[test]
    fn acquire_creates_lock_file() {
        let temp = TempDir::new().unwrap();
        let paths = StorePaths::new(temp.path().to_path_buf());
        let key = course("course-v1:e+d+X");

        let _lock = CourseLock::acquire(&paths, &key).expect("acquire");
        assert!(paths.course_lock_path(&key).is_file());
    }

    #[test]
    fn different_courses_do_not_contend() {
        let temp = TempDir::new().unwrap();
        let paths = StorePaths::new(temp.path().to_path_buf());

        let _a = CourseLock::acquire(&paths, &course("course-v1:e+d+X")).unwrap();
        assert!(acquires_within(
            &paths,
            &course("course-v1:e+d+Y"),
            Duration::from_secs(5)
        ));
    }

    #[test]
    fn acquire_waits_for_holder_until_drop() {
        let temp = TempDir::new().unwrap();
        let paths = StorePaths::new(temp.path().to_path_buf());
        let key = course("course-v1:e+d+X");

        let held = CourseLock::acquire(&paths, &key).unwrap();
        let (tx, rx) = mpsc::channel();

        let waiter = {
            let paths = paths.clone();
            let key = key.clone();
            thread::spawn(move || {
                let lock = CourseLock::acquire(&paths, &key).unwrap();
                tx.send(()).unwrap();
                drop(lock);
            })
        };

        // Waiter must not get through while we hold the lock.
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
        drop(held);
        rx.recv_timeout(Duration::from_secs(5))
            .expect("waiter acquires after drop");
        waiter.join().unwrap();

        assert!(acquires_within(&paths, &key, Duration::from_secs(5)));
    }

    #[test]
    fn error_display_formatting() {
        assert!(LockError::CreateFailed("x".into())
            .to_string()
            .contains("create"));
        assert!(LockError::AcquireFailed("x".into())
            .to_string()
            .contains("acquire"));
    }
}
