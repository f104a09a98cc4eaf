//! Core use-case services.
//!
//! # Responsibility
//! - Own the mutable planner state (tasks, pill tokens) behind stable APIs.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod assignment;
pub mod pill_track;
