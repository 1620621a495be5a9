//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! Command handlers print through this module so quiet and debug modes are
//! honored consistently. Diagnostics meant for operators go through
//! `tracing` instead.

pub mod output;
