//! Requirements analyst: turns free-text requirements into a validated
//! acceptance criteria document.
//!
//! A run is a small state machine (ANALYZE, VALIDATE, ESCALATE, DONE) that
//! generates a document, checks its required sections, retries within a fixed
//! budget, and hands persistent failures to a human reviewer. The crate keeps
//! a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (session state, transition table,
//!   retry policy, section checks). No I/O.
//! - **[`io`]**: Side-effecting collaborators (generator and reviewer commands,
//!   artifact files, config). Each sits behind a trait so tests can script it.
//!
//! [`orchestrator`] drives the machine by calling collaborators and committing
//! their outcomes through the transition table.

pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod orchestrator;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
