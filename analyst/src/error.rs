//! Failure taxonomy surfaced to callers of a run.
//!
//! Collaborator errors never escape the driver loop. Each phase boundary
//! converts them into one of these variants and stores it on the session; the
//! variant's `Display` becomes the run's `error_message`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a run (or one of its attempts) failed.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunError {
    /// Empty or missing requirements. Fatal, never retried.
    #[error("input error: {message}")]
    Input { message: String },

    /// The generator backend failed. Counted like a failed validation.
    #[error("generation failed: {message}")]
    Generation { message: String },

    /// Structural mismatch or an unexpected validator error.
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// The retry budget is spent; the artifact goes to a reviewer.
    #[error("validation failed after maximum retries ({max_retries}): {last}")]
    RetriesExhausted { max_retries: u32, last: String },

    /// The reviewer rejected the artifact.
    #[error("escalation rejected: {feedback}")]
    EscalationRejected { feedback: String },

    /// The escalation channel itself failed.
    #[error("escalation failed: {message}")]
    Escalation { message: String },

    /// The run could not be driven at all (malformed payload, broken table).
    #[error("workflow failed: {message}")]
    Workflow { message: String },
}

impl RunError {
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
        }
    }

    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn escalation_rejected(feedback: impl Into<String>) -> Self {
        Self::EscalationRejected {
            feedback: feedback.into(),
        }
    }

    pub fn escalation(message: impl Into<String>) -> Self {
        Self::Escalation {
            message: message.into(),
        }
    }

    pub fn workflow(message: impl Into<String>) -> Self {
        Self::Workflow {
            message: message.into(),
        }
    }

    /// Stable label used in metadata and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Input { .. } => "input",
            Self::Generation { .. } => "generation",
            Self::Validation { .. } => "validation",
            Self::RetriesExhausted { .. } => "retries_exhausted",
            Self::EscalationRejected { .. } => "escalation_rejected",
            Self::Escalation { .. } => "escalation",
            Self::Workflow { .. } => "workflow",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_stage() {
        assert_eq!(
            RunError::input("no requirements provided").to_string(),
            "input error: no requirements provided"
        );
        assert_eq!(
            RunError::escalation_rejected("missing edge cases").to_string(),
            "escalation rejected: missing edge cases"
        );
        let exhausted = RunError::RetriesExhausted {
            max_retries: 3,
            last: "Missing required section: user_story".to_string(),
        };
        assert_eq!(
            exhausted.to_string(),
            "validation failed after maximum retries (3): Missing required section: user_story"
        );
    }

    #[test]
    fn serializes_with_kind_tag() {
        let value = serde_json::to_value(RunError::generation("backend down")).expect("json");
        assert_eq!(value["kind"], "generation");
        assert_eq!(value["message"], "backend down");
    }
}
