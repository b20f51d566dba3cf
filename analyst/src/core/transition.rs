//! Transition table for the orchestrator state machine.
//!
//! [`route`] is the table: `(phase, trigger)` plus the retry budget decides the
//! next phase. [`apply`] performs the effects of a phase outcome on the session
//! and records the edge. Neither touches I/O.
//!
//! | From     | Trigger                        | To                      |
//! |----------|--------------------------------|-------------------------|
//! | ANALYZE  | generated                      | VALIDATE                |
//! | ANALYZE  | input rejected                 | DONE                    |
//! | ANALYZE  | generation failed              | ANALYZE / ESCALATE      |
//! | VALIDATE | passed                         | DONE                    |
//! | VALIDATE | failed / errored               | ANALYZE / ESCALATE      |
//! | ESCALATE | approved / rejected / errored  | DONE                    |
//!
//! "ANALYZE / ESCALATE" means ANALYZE while retries remain, ESCALATE once the
//! budget is spent.

use serde_json::{Value, json};
use thiserror::Error;

use crate::core::policy::RetryPolicy;
use crate::core::types::{Phase, PhaseTransition, SessionState, Trigger, ValidationReport};
use crate::error::RunError;

/// A `(phase, trigger)` pair with no row in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal transition: {trigger} while in {phase}")]
pub struct IllegalTransition {
    pub phase: Phase,
    pub trigger: Trigger,
}

/// What a phase handler observed, with the data its effects need.
#[derive(Debug, Clone, PartialEq)]
pub enum PhaseOutcome {
    Generated { criteria: String },
    InputRejected { message: String },
    GenerationFailed { message: String },
    ValidationPassed { report: ValidationReport },
    ValidationFailed { report: ValidationReport },
    ValidationErrored { message: String },
    EscalationApproved {
        criteria: String,
        changes_made: bool,
        feedback: Option<String>,
    },
    EscalationRejected { feedback: String },
    EscalationErrored { message: String },
}

impl PhaseOutcome {
    pub fn trigger(&self) -> Trigger {
        match self {
            PhaseOutcome::Generated { .. } => Trigger::Generated,
            PhaseOutcome::InputRejected { .. } => Trigger::InputRejected,
            PhaseOutcome::GenerationFailed { .. } => Trigger::GenerationFailed,
            PhaseOutcome::ValidationPassed { .. } => Trigger::ValidationPassed,
            PhaseOutcome::ValidationFailed { .. } => Trigger::ValidationFailed,
            PhaseOutcome::ValidationErrored { .. } => Trigger::ValidationErrored,
            PhaseOutcome::EscalationApproved { .. } => Trigger::EscalationApproved,
            PhaseOutcome::EscalationRejected { .. } => Trigger::EscalationRejected,
            PhaseOutcome::EscalationErrored { .. } => Trigger::EscalationErrored,
        }
    }
}

/// Look up the next phase for `trigger` observed in `phase`.
pub fn route(
    phase: Phase,
    trigger: Trigger,
    retry_count: u32,
    policy: &RetryPolicy,
) -> Result<Phase, IllegalTransition> {
    let retry_or_escalate = if policy.allows_retry(retry_count) {
        Phase::Analyze
    } else {
        Phase::Escalate
    };
    match (phase, trigger) {
        (Phase::Analyze, Trigger::Generated) => Ok(Phase::Validate),
        (Phase::Analyze, Trigger::InputRejected) => Ok(Phase::Done),
        (Phase::Analyze, Trigger::GenerationFailed) => Ok(retry_or_escalate),
        (Phase::Validate, Trigger::ValidationPassed) => Ok(Phase::Done),
        (Phase::Validate, Trigger::ValidationFailed | Trigger::ValidationErrored) => {
            Ok(retry_or_escalate)
        }
        (
            Phase::Escalate,
            Trigger::EscalationApproved | Trigger::EscalationRejected | Trigger::EscalationErrored,
        ) => Ok(Phase::Done),
        (_, Trigger::Aborted) if phase != Phase::Done => Ok(Phase::Done),
        _ => Err(IllegalTransition { phase, trigger }),
    }
}

/// Apply `outcome` to `state`, move it to the routed phase, and record the edge.
///
/// A terminal session rejects every outcome; callers check `done` first.
pub fn apply(
    state: &mut SessionState,
    outcome: PhaseOutcome,
    policy: &RetryPolicy,
) -> Result<PhaseTransition, IllegalTransition> {
    let from = state.phase;
    let trigger = outcome.trigger();
    if state.done {
        return Err(IllegalTransition {
            phase: Phase::Done,
            trigger,
        });
    }
    let to = route(from, trigger, state.retry_count, policy)?;

    match outcome {
        PhaseOutcome::Generated { criteria } => {
            state
                .metadata
                .insert("criteria_length".to_string(), json!(criteria.len()));
            state.criteria = criteria;
            state.validation_passed = false;
            state.error = None;
        }
        PhaseOutcome::InputRejected { message } => {
            state.error = Some(RunError::input(message));
        }
        PhaseOutcome::GenerationFailed { message } => {
            record_failure(state, to, RunError::generation(message), policy);
        }
        PhaseOutcome::ValidationPassed { report } => {
            record_report(state, report);
            state.validation_passed = true;
            state.error = None;
        }
        PhaseOutcome::ValidationFailed { report } => {
            let failure = RunError::validation(report.failure_summary());
            record_report(state, report);
            record_failure(state, to, failure, policy);
        }
        PhaseOutcome::ValidationErrored { message } => {
            state.metadata.insert(
                "validation_details".to_string(),
                json!({ "status": "error", "message": message }),
            );
            let entry = json!({
                "attempt": state.retry_count + 1,
                "passed": false,
                "reason": message,
            });
            push_history(state, entry);
            record_failure(state, to, RunError::validation(message), policy);
        }
        PhaseOutcome::EscalationApproved {
            criteria,
            changes_made,
            feedback,
        } => {
            state.criteria = criteria;
            state.validation_passed = true;
            state.error = None;
            state.metadata.insert(
                "validation_details".to_string(),
                json!({ "status": "human_reviewed" }),
            );
            state.metadata.insert(
                "escalation".to_string(),
                json!({
                    "approved": true,
                    "changes_made": changes_made,
                    "feedback": feedback,
                }),
            );
        }
        PhaseOutcome::EscalationRejected { feedback } => {
            state.validation_passed = false;
            state.metadata.insert(
                "escalation".to_string(),
                json!({ "approved": false, "feedback": feedback }),
            );
            state.error = Some(RunError::escalation_rejected(feedback));
        }
        PhaseOutcome::EscalationErrored { message } => {
            state.validation_passed = false;
            state.metadata.insert(
                "escalation".to_string(),
                json!({ "approved": false, "error": message }),
            );
            state.error = Some(RunError::escalation(message));
        }
    }

    Ok(enter(state, from, to, trigger))
}

/// Force a non-terminal session to DONE with `error`.
///
/// Returns `None` when the session was already terminal.
pub fn abort(state: &mut SessionState, error: RunError) -> Option<PhaseTransition> {
    if state.done {
        return None;
    }
    let from = state.phase;
    state.validation_passed = false;
    state.error = Some(error);
    Some(enter(state, from, Phase::Done, Trigger::Aborted))
}

fn enter(state: &mut SessionState, from: Phase, to: Phase, trigger: Trigger) -> PhaseTransition {
    state.phase = to;
    if to == Phase::Done {
        state.done = true;
        if let Some(error) = &state.error {
            state
                .metadata
                .insert("failure_kind".to_string(), json!(error.kind()));
        }
    }
    let transition = PhaseTransition {
        from,
        to,
        trigger,
        retry_count: state.retry_count,
    };
    state.transitions.push(transition.clone());
    transition
}

/// Effects shared by every failed attempt: retry or hand off to a reviewer.
fn record_failure(state: &mut SessionState, to: Phase, failure: RunError, policy: &RetryPolicy) {
    state.validation_passed = false;
    match to {
        Phase::Analyze => {
            state.retry_count += 1;
            state.criteria.clear();
            state.error = Some(failure);
        }
        Phase::Escalate => {
            state
                .metadata
                .insert("max_retries_exceeded".to_string(), Value::Bool(true));
            state.error = Some(RunError::RetriesExhausted {
                max_retries: policy.max_retries(),
                last: failure.to_string(),
            });
        }
        Phase::Validate | Phase::Done => {
            state.error = Some(failure);
        }
    }
}

fn record_report(state: &mut SessionState, report: ValidationReport) {
    let details = serde_json::to_value(&report.details).unwrap_or(Value::Null);
    state
        .metadata
        .insert("validation_details".to_string(), details);
    let entry = json!({
        "attempt": state.retry_count + 1,
        "passed": report.passed,
        "reason": report.reason,
    });
    push_history(state, entry);
    state.last_report = Some(report);
}

fn push_history(state: &mut SessionState, entry: Value) {
    let history = state
        .metadata
        .entry("validation_history".to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Value::Array(items) = history {
        items.push(entry);
    }
}
