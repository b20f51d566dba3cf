//! Side-effecting collaborators behind traits.

pub mod artifact;
pub mod config;
pub mod escalation;
pub mod generator;
pub mod payload;
pub mod process;
pub mod prompt;
pub mod validator;
