//! Test fixtures shared by unit and integration tests
//!
//! Builders for boards and members, plus ready-wired managers over the
//! in-memory store with a fixed signing key.

pub mod fixtures;

pub use fixtures::*;
