//! core
//!
//! Core domain types, configuration, and on-disk plumbing.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Branch, ContentVersion, BranchVersionMap, Actor
//! - [`course_key`] - Course key parsing and branch locators
//! - [`config`] - Configuration schema and loading
//! - [`paths`] - Centralized path routing for store files
//! - [`ops`] - Per-course locking
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Validation happens once, at parse time
//! - On-disk records are strict and self-describing

pub mod config;
pub mod course_key;
pub mod ops;
pub mod paths;
pub mod types;
