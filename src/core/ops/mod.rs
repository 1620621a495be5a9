//! core::ops
//!
//! Locking for mutating store operations.
//!
//! # Modules
//!
//! - [`lock`] - Exclusive per-course lock
//!
//! # Architecture
//!
//! Every branch pointer update:
//! 1. Acquires the course lock
//! 2. Re-reads the index and checks the caller's expected snapshot
//! 3. Writes the new index atomically (temp file, fsync, rename)
//! 4. Releases the lock on drop

pub mod lock;

pub use lock::{CourseLock, LockError};
