//! Coursekeeper - maintenance tooling for versioned course branches
//!
//! Every course in a versioned store has two branch pointers, draft and
//! published, each naming an immutable content version. Coursekeeper
//! inspects those pointers and can force the published branch to match the
//! draft when normal publishing has failed or the branches have diverged.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates)
//! - [`publish`] - The force-publish operation and its outcomes
//! - [`resolve`] - Course text to a course the store holds
//! - [`store`] - Branch-pointer backends (versioned, legacy, router)
//! - [`audit`] - Append-only record of every invocation
//! - [`access`] - Staff authorization
//! - [`core`] - Domain types, configuration, paths, and locking
//! - [`ui`] - User-facing output
//!
//! # Correctness Invariants
//!
//! 1. Force-publish moves only the published pointer, at most once per call
//! 2. A pointer move applies only against the snapshot it was compared with
//! 3. Legacy courses are refused, never partially updated
//! 4. Every invocation leaves exactly one audit entry

pub mod access;
pub mod audit;
pub mod cli;
pub mod core;
pub mod publish;
pub mod resolve;
pub mod store;
pub mod ui;
