//! Session-state invariants checked after every run.

use crate::core::policy::RetryPolicy;
use crate::core::types::{Phase, SessionState};

/// Check invariants that must hold for any session the driver hands back:
/// - `retry_count <= max_retries`
/// - `validation_passed` implies non-empty `criteria`
/// - `done` and `phase == DONE` agree
/// - a terminal session is either validated or carries an error, never both
///
/// Returns a list of stable error messages (empty on success).
pub fn check_session_invariants(state: &SessionState, policy: &RetryPolicy) -> Vec<String> {
    let mut errors = Vec::new();

    if state.retry_count > policy.max_retries() {
        errors.push(format!(
            "retry_count {} exceeds max_retries {}",
            state.retry_count,
            policy.max_retries()
        ));
    }

    if state.validation_passed && state.criteria.trim().is_empty() {
        errors.push("validation_passed with empty criteria".to_string());
    }

    if state.done != (state.phase == Phase::Done) {
        errors.push(format!(
            "done={} disagrees with phase={}",
            state.done, state.phase
        ));
    }

    if state.done {
        match (state.validation_passed, state.error.is_some()) {
            (true, true) => errors.push("terminal state is both validated and failed".to_string()),
            (false, false) => {
                errors.push("terminal state is neither validated nor failed".to_string());
            }
            _ => {}
        }
    }

    errors
}
