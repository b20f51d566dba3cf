//! Deterministic, pure logic for the orchestration core.
//!
//! Core modules must be free of I/O side effects. They operate on the session
//! record and return deterministic outputs suitable for tests.

pub mod invariants;
pub mod policy;
pub mod sections;
pub mod transition;
pub mod types;
