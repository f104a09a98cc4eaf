//! Flutter-facing FFI crate for the dayplan planner.
//!
//! # Responsibility
//! - Expose the planner session to Dart through flutter_rust_bridge.
//! - Keep every exported function panic-free across the FFI boundary.

pub mod api;
