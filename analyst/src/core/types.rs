//! Shared deterministic types for the orchestration core.
//!
//! The session record is the single canonical state threaded through a run.
//! Serde derives exist for the process boundary (run reports, debugging), never
//! as an alternate in-memory representation.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RunError;

/// Output type understood by the default section checker.
pub const ACCEPTANCE_CRITERIA: &str = "acceptance_criteria";

/// Explicit current state of the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Analyze,
    Validate,
    Escalate,
    Done,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Analyze => "analyze",
            Phase::Validate => "validate",
            Phase::Escalate => "escalate",
            Phase::Done => "done",
        }
    }

    /// Entering this phase starts a new round (a generation or a review).
    pub fn starts_round(self) -> bool {
        matches!(self, Phase::Analyze | Phase::Escalate)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event that drives a transition out of the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Generated,
    InputRejected,
    GenerationFailed,
    ValidationPassed,
    ValidationFailed,
    ValidationErrored,
    EscalationApproved,
    EscalationRejected,
    EscalationErrored,
    /// Forced termination by the driver (ceiling hit, illegal transition).
    Aborted,
}

impl Trigger {
    pub fn as_str(self) -> &'static str {
        match self {
            Trigger::Generated => "generated",
            Trigger::InputRejected => "input_rejected",
            Trigger::GenerationFailed => "generation_failed",
            Trigger::ValidationPassed => "validation_passed",
            Trigger::ValidationFailed => "validation_failed",
            Trigger::ValidationErrored => "validation_errored",
            Trigger::EscalationApproved => "escalation_approved",
            Trigger::EscalationRejected => "escalation_rejected",
            Trigger::EscalationErrored => "escalation_errored",
            Trigger::Aborted => "aborted",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded edge of the state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub from: Phase,
    pub to: Phase,
    pub trigger: Trigger,
    /// Retry counter after the transition's effects were applied.
    pub retry_count: u32,
}

/// Presence of one required section in a checked document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionFinding {
    pub section: String,
    pub found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<usize>,
    /// Non-blank lines belonging to the section.
    pub content_lines: usize,
}

/// Itemized reason a document failed the structural check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionFailure {
    pub section: String,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<usize>,
}

/// Structured diagnostics attached to a validation report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationDetails {
    pub output_type: String,
    pub sections: Vec<SectionFinding>,
    pub failures: Vec<SectionFailure>,
}

/// Result of validating a candidate document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub passed: bool,
    pub reason: String,
    pub details: ValidationDetails,
}

impl ValidationReport {
    /// One-line summary of the failures, suitable for an error message.
    pub fn failure_summary(&self) -> String {
        if self.details.failures.is_empty() {
            return self.reason.clone();
        }
        self.details
            .failures
            .iter()
            .map(|failure| failure.reason.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Reviewer verdict returned by an escalation handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationDecision {
    pub approved: bool,
    #[serde(default)]
    pub updated_text: Option<String>,
    #[serde(default)]
    pub feedback: Option<String>,
}

impl EscalationDecision {
    pub fn approve(updated_text: Option<String>) -> Self {
        Self {
            approved: true,
            updated_text,
            feedback: None,
        }
    }

    pub fn reject(feedback: impl Into<String>) -> Self {
        Self {
            approved: false,
            updated_text: None,
            feedback: Some(feedback.into()),
        }
    }
}

/// The single mutable record threaded through a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    requirements: String,
    /// Current candidate document; empty until generation succeeds.
    pub criteria: String,
    pub validation_passed: bool,
    /// Incremented once per failed attempt that leads back to ANALYZE.
    pub retry_count: u32,
    pub error: Option<RunError>,
    /// Auxiliary diagnostics. Keys are added or updated, never removed.
    pub metadata: BTreeMap<String, Value>,
    pub phase: Phase,
    pub done: bool,
    /// Latest validation report, kept for itemized failure output.
    pub last_report: Option<ValidationReport>,
    pub transitions: Vec<PhaseTransition>,
}

impl SessionState {
    pub fn new(requirements: impl Into<String>) -> Self {
        Self {
            requirements: requirements.into(),
            criteria: String::new(),
            validation_passed: false,
            retry_count: 0,
            error: None,
            metadata: BTreeMap::new(),
            phase: Phase::Analyze,
            done: false,
            last_report: None,
            transitions: Vec::new(),
        }
    }

    pub fn requirements(&self) -> &str {
        &self.requirements
    }

    /// True once a reviewer was consulted during this run.
    pub fn escalated(&self) -> bool {
        self.transitions
            .iter()
            .any(|transition| transition.from == Phase::Escalate)
    }
}

/// Caller-facing result of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub success: bool,
    pub acceptance_criteria: String,
    /// Human-readable failure; empty on success.
    pub error_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RunError>,
    pub metadata: BTreeMap<String, Value>,
    pub retry_count: u32,
    /// Itemized section failures from the latest validation (failed runs only).
    pub failures: Vec<SectionFailure>,
    pub escalated: bool,
    pub transitions: Vec<PhaseTransition>,
}

impl RunOutcome {
    pub fn from_state(state: SessionState) -> Self {
        let escalated = state.escalated();
        let success = state.done && state.error.is_none() && state.validation_passed;
        let failures = if success {
            Vec::new()
        } else {
            state
                .last_report
                .map(|report| report.details.failures)
                .unwrap_or_default()
        };
        let error = if success {
            None
        } else {
            Some(state.error.unwrap_or_else(|| {
                RunError::workflow("run ended without a validated document")
            }))
        };
        Self {
            success,
            acceptance_criteria: state.criteria,
            error_message: error.as_ref().map(ToString::to_string).unwrap_or_default(),
            error,
            metadata: state.metadata,
            retry_count: state.retry_count,
            failures,
            escalated,
            transitions: state.transitions,
        }
    }

    /// Result for input that could not even be turned into a session.
    pub fn workflow_failure(message: impl Into<String>) -> Self {
        let error = RunError::workflow(message);
        Self {
            success: false,
            acceptance_criteria: String::new(),
            error_message: error.to_string(),
            error: Some(error),
            metadata: BTreeMap::new(),
            retry_count: 0,
            failures: Vec::new(),
            escalated: false,
            transitions: Vec::new(),
        }
    }
}
