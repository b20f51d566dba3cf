//! Phase handlers and the driver loop.
//!
//! Each handler inspects the session, calls at most one collaborator, turns
//! whatever happened into a [`PhaseOutcome`], and commits it through the
//! transition table. Collaborator errors never escape a handler.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use crate::core::invariants::check_session_invariants;
use crate::core::policy::{RetryPolicy, RunBudget};
use crate::core::transition::{PhaseOutcome, abort, apply};
use crate::core::types::{
    ACCEPTANCE_CRITERIA, EscalationDecision, Phase, PhaseTransition, RunOutcome, SessionState,
};
use crate::error::RunError;
use crate::io::artifact::{ArtifactStore, FsArtifactStore};
use crate::io::config::AnalystConfig;
use crate::io::escalation::{ConfiguredEscalation, Escalation, EscalationRequest};
use crate::io::generator::{CommandGenerator, GenerateRequest, Generator};
use crate::io::payload::parse_payload;
use crate::io::validator::{SectionValidator, ValidateRequest, Validator};

/// Settings the orchestrator needs, detached from the on-disk config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    pub max_retries: u32,
    /// Wall-clock budget for one run.
    pub run_timeout: Duration,
    pub output_type: String,
    /// Logical name of the persisted criteria artifact.
    pub artifact_name: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self::from(&AnalystConfig::default())
    }
}

impl From<&AnalystConfig> for OrchestratorConfig {
    fn from(cfg: &AnalystConfig) -> Self {
        Self {
            max_retries: cfg.max_retries,
            run_timeout: cfg.run_timeout(),
            output_type: ACCEPTANCE_CRITERIA.to_string(),
            artifact_name: cfg.artifacts.acceptance_criteria.clone(),
        }
    }
}

pub struct Orchestrator<G, V, E, S> {
    config: OrchestratorConfig,
    policy: RetryPolicy,
    generator: G,
    validator: V,
    escalation: E,
    store: S,
}

/// Orchestrator wired to the configured commands and the filesystem.
pub type ConfiguredOrchestrator =
    Orchestrator<CommandGenerator, SectionValidator, ConfiguredEscalation, FsArtifactStore>;

impl ConfiguredOrchestrator {
    /// Build from config; artifacts land under `root/<artifacts.output_dir>`.
    pub fn from_config(cfg: &AnalystConfig, root: &Path) -> Result<Self> {
        cfg.validate()?;
        let generator =
            CommandGenerator::new(cfg.generator.command.clone(), cfg.output_limit_bytes)?;
        let escalation =
            ConfiguredEscalation::from_config(&cfg.escalation, cfg.output_limit_bytes)?;
        let store = FsArtifactStore::new(root.join(&cfg.artifacts.output_dir));
        Ok(Orchestrator::new(
            OrchestratorConfig::from(cfg),
            generator,
            SectionValidator,
            escalation,
            store,
        ))
    }
}

impl<G, V, E, S> Orchestrator<G, V, E, S>
where
    G: Generator,
    V: Validator,
    E: Escalation,
    S: ArtifactStore,
{
    pub fn new(
        config: OrchestratorConfig,
        generator: G,
        validator: V,
        escalation: E,
        store: S,
    ) -> Self {
        let policy = RetryPolicy::new(config.max_retries);
        Self {
            config,
            policy,
            generator,
            validator,
            escalation,
            store,
        }
    }

    /// Run the state machine to completion for `requirements`.
    #[instrument(skip_all, fields(max_retries = self.config.max_retries))]
    pub fn run(&self, requirements: &str) -> RunOutcome {
        let mut state = SessionState::new(requirements);
        let budget = RunBudget::starting_now(self.config.run_timeout);
        self.drive(&mut state, &budget);
        self.finish(state)
    }

    /// Run from a raw JSON payload (`{"requirements": "..."}`).
    ///
    /// A payload that cannot become a session never enters the phase machinery.
    pub fn run_payload(&self, raw: &str) -> RunOutcome {
        match parse_payload(raw) {
            Ok(payload) => self.run(&payload.requirements),
            Err(err) => {
                warn!(err = %format!("{err:#}"), "rejecting run payload");
                RunOutcome::workflow_failure(format!("{err:#}"))
            }
        }
    }

    /// Drive `state` until it is terminal.
    ///
    /// Terminates after at most `max_retries + 2` rounds even if a handler
    /// misbehaves; a stalled or runaway session is aborted with a workflow error.
    pub fn drive(&self, state: &mut SessionState, budget: &RunBudget) {
        self.drive_with_ceiling(state, budget, self.policy.round_ceiling());
    }

    fn drive_with_ceiling(&self, state: &mut SessionState, budget: &RunBudget, ceiling: u32) {
        let mut rounds = u32::from(state.phase.starts_round());
        while !state.done {
            let Some(transition) = self.step(state, budget) else {
                let message = format!("no handler made progress in phase {}", state.phase);
                self.abort_run(state, message);
                break;
            };
            if transition.to.starts_round() {
                rounds += 1;
                if rounds > ceiling {
                    let message = format!("round ceiling {ceiling} exceeded");
                    self.abort_run(state, message);
                    break;
                }
            }
        }
    }

    /// Run the handler for the current phase. `None` once the session is terminal.
    pub fn step(&self, state: &mut SessionState, budget: &RunBudget) -> Option<PhaseTransition> {
        match state.phase {
            Phase::Analyze => self.analyze(state, budget),
            Phase::Validate => self.validate(state),
            Phase::Escalate => self.escalate(state, budget),
            Phase::Done => None,
        }
    }

    /// ANALYZE: generate a candidate document.
    ///
    /// No-op (returns `None`) unless the session is live and in ANALYZE.
    pub fn analyze(
        &self,
        state: &mut SessionState,
        budget: &RunBudget,
    ) -> Option<PhaseTransition> {
        if state.done || state.phase != Phase::Analyze {
            return None;
        }
        if state.requirements().trim().is_empty() {
            return self.commit(
                state,
                PhaseOutcome::InputRejected {
                    message: "requirements must not be empty".to_string(),
                },
            );
        }

        let outcome = match budget.remaining() {
            Err(err) => PhaseOutcome::GenerationFailed {
                message: err.to_string(),
            },
            Ok(timeout) => {
                let request = GenerateRequest {
                    requirements: state.requirements().to_string(),
                    attempt: state.retry_count + 1,
                    previous_failure: state.error.as_ref().map(ToString::to_string),
                    timeout,
                };
                match self.generator.generate(&request) {
                    Ok(text) if text.trim().is_empty() => PhaseOutcome::GenerationFailed {
                        message: "generator returned an empty document".to_string(),
                    },
                    Ok(text) => PhaseOutcome::Generated { criteria: text },
                    Err(err) => {
                        warn!(
                            err = %format!("{err:#}"),
                            attempt = request.attempt,
                            "generation failed"
                        );
                        PhaseOutcome::GenerationFailed {
                            message: format!("{err:#}"),
                        }
                    }
                }
            }
        };
        self.commit(state, outcome)
    }

    /// VALIDATE: check the candidate and persist it when it passes.
    ///
    /// A validator error or a failed write counts as a failed validation.
    pub fn validate(&self, state: &mut SessionState) -> Option<PhaseTransition> {
        if state.done || state.phase != Phase::Validate {
            return None;
        }
        let request = ValidateRequest {
            output_type: &self.config.output_type,
            text: &state.criteria,
            original_requirements: state.requirements(),
        };
        let outcome = match self.validator.validate(&request) {
            Ok(report) if report.passed => match self.persist(&state.criteria) {
                Ok(()) => PhaseOutcome::ValidationPassed { report },
                Err(message) => PhaseOutcome::ValidationErrored { message },
            },
            Ok(report) => {
                debug!(failures = report.details.failures.len(), "validation failed");
                PhaseOutcome::ValidationFailed { report }
            }
            Err(err) => {
                warn!(err = %format!("{err:#}"), "validator errored");
                PhaseOutcome::ValidationErrored {
                    message: format!("validator error: {err:#}"),
                }
            }
        };
        self.commit(state, outcome)
    }

    /// ESCALATE: hand the document to a reviewer; their verdict is final.
    pub fn escalate(
        &self,
        state: &mut SessionState,
        budget: &RunBudget,
    ) -> Option<PhaseTransition> {
        if state.done || state.phase != Phase::Escalate {
            return None;
        }
        let outcome = match budget.remaining() {
            Err(err) => PhaseOutcome::EscalationErrored {
                message: err.to_string(),
            },
            Ok(timeout) => {
                let request = EscalationRequest {
                    requirements: state.requirements().to_string(),
                    criteria: state.criteria.clone(),
                    error_context: state.error.as_ref().map(ToString::to_string),
                    output_type: self.config.output_type.clone(),
                    timeout,
                };
                match self.escalation.escalate(&request) {
                    Ok(decision) => self.review_outcome(state, decision),
                    Err(err) => {
                        warn!(err = %format!("{err:#}"), "escalation channel failed");
                        PhaseOutcome::EscalationErrored {
                            message: format!("{err:#}"),
                        }
                    }
                }
            }
        };
        self.commit(state, outcome)
    }

    fn review_outcome(&self, state: &SessionState, decision: EscalationDecision) -> PhaseOutcome {
        if !decision.approved {
            let feedback = decision
                .feedback
                .filter(|feedback| !feedback.trim().is_empty())
                .unwrap_or_else(|| "reviewer gave no feedback".to_string());
            return PhaseOutcome::EscalationRejected { feedback };
        }

        let replacement = decision
            .updated_text
            .filter(|text| !text.trim().is_empty());
        let (criteria, changes_made) = match replacement {
            Some(text) => {
                let changed = text != state.criteria;
                (text, changed)
            }
            None if !state.criteria.trim().is_empty() => (state.criteria.clone(), false),
            None => {
                return PhaseOutcome::EscalationErrored {
                    message: "reviewer approved without a document".to_string(),
                };
            }
        };
        match self.persist(&criteria) {
            Ok(()) => PhaseOutcome::EscalationApproved {
                criteria,
                changes_made,
                feedback: decision.feedback,
            },
            Err(message) => PhaseOutcome::EscalationErrored { message },
        }
    }

    fn persist(&self, criteria: &str) -> Result<(), String> {
        self.store
            .persist(criteria, &self.config.artifact_name)
            .map_err(|err| {
                warn!(
                    err = %format!("{err:#}"),
                    artifact = %self.config.artifact_name,
                    "persist failed"
                );
                format!("persist {}: {err:#}", self.config.artifact_name)
            })
    }

    fn commit(&self, state: &mut SessionState, outcome: PhaseOutcome) -> Option<PhaseTransition> {
        match apply(state, outcome, &self.policy) {
            Ok(transition) => {
                log_transition(&transition);
                Some(transition)
            }
            Err(err) => {
                self.abort_run(state, err.to_string());
                state.transitions.last().cloned()
            }
        }
    }

    fn abort_run(&self, state: &mut SessionState, message: String) {
        warn!(phase = %state.phase, reason = %message, "aborting run");
        if let Some(transition) = abort(state, RunError::workflow(message)) {
            log_transition(&transition);
        }
    }

    fn finish(&self, mut state: SessionState) -> RunOutcome {
        let violations = check_session_invariants(&state, &self.policy);
        if !violations.is_empty() {
            warn!(violations = %violations.join("; "), "session invariants violated");
            state
                .metadata
                .insert("invariant_violations".to_string(), json!(violations));
        }
        let outcome = RunOutcome::from_state(state);
        info!(
            success = outcome.success,
            retry_count = outcome.retry_count,
            escalated = outcome.escalated,
            "run finished"
        );
        outcome
    }
}

fn log_transition(transition: &PhaseTransition) {
    info!(
        from = %transition.from,
        to = %transition.to,
        trigger = %transition.trigger,
        retry_count = transition.retry_count,
        "transition"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Trigger;
    use crate::test_support::{
        MemoryStore, ScriptedEscalation, ScriptedGenerator, ScriptedValidator, Verdict,
        incomplete_document, sample_document, test_config,
    };

    fn budget() -> RunBudget {
        RunBudget::starting_now(Duration::from_secs(60))
    }

    fn triggers(outcome: &RunOutcome) -> Vec<Trigger> {
        outcome.transitions.iter().map(|t| t.trigger).collect()
    }

    #[test]
    fn happy_path_persists_and_succeeds() {
        let generator = ScriptedGenerator::always(sample_document());
        let validator = ScriptedValidator::from_pattern(&[true]);
        let escalation = ScriptedEscalation::rejecting("unused");
        let store = MemoryStore::new();
        let orchestrator =
            Orchestrator::new(test_config(3), &generator, &validator, &escalation, &store);

        let outcome = orchestrator.run("As a user I want to reset my password");

        assert!(outcome.success);
        assert_eq!(outcome.retry_count, 0);
        assert!(outcome.error_message.is_empty());
        assert_eq!(outcome.acceptance_criteria, sample_document());
        assert_eq!(
            store.get("AcceptanceCriteria.md").as_deref(),
            Some(sample_document().as_str())
        );
        assert_eq!(escalation.calls(), 0);
        assert_eq!(
            triggers(&outcome),
            vec![Trigger::Generated, Trigger::ValidationPassed]
        );
        assert_eq!(outcome.metadata["criteria_length"], json!(sample_document().len()));
    }

    /// Retries feed the previous failure back into the next generation.
    #[test]
    fn retry_carries_previous_failure() {
        let generator = ScriptedGenerator::always(incomplete_document());
        let validator = ScriptedValidator::from_pattern(&[false, true]);
        let escalation = ScriptedEscalation::rejecting("unused");
        let store = MemoryStore::new();
        let orchestrator =
            Orchestrator::new(test_config(3), &generator, &validator, &escalation, &store);

        let outcome = orchestrator.run("story");

        assert!(outcome.success);
        assert_eq!(outcome.retry_count, 1);
        let requests = generator.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].attempt, 1);
        assert_eq!(requests[0].previous_failure, None);
        assert_eq!(requests[1].attempt, 2);
        let previous = requests[1].previous_failure.as_deref().expect("previous failure");
        assert!(previous.contains("Missing required section: open_questions"));
    }

    #[test]
    fn blank_generator_output_counts_as_generation_failure() {
        let generator = ScriptedGenerator::new(vec![Ok("   ".to_string()), Ok(sample_document())]);
        let validator = ScriptedValidator::from_pattern(&[true]);
        let escalation = ScriptedEscalation::rejecting("unused");
        let store = MemoryStore::new();
        let orchestrator =
            Orchestrator::new(test_config(3), &generator, &validator, &escalation, &store);

        let outcome = orchestrator.run("story");

        assert!(outcome.success);
        assert_eq!(outcome.retry_count, 1);
        assert_eq!(validator.calls(), 1);
        assert_eq!(outcome.transitions[0].trigger, Trigger::GenerationFailed);
    }

    #[test]
    fn persist_failure_on_pass_is_a_failed_validation() {
        let generator = ScriptedGenerator::always(sample_document());
        let validator = ScriptedValidator::from_pattern(&[true]);
        let escalation = ScriptedEscalation::rejecting("disk full");
        let store = MemoryStore::failing("disk full");
        let orchestrator =
            Orchestrator::new(test_config(1), &generator, &validator, &escalation, &store);

        let outcome = orchestrator.run("story");

        assert!(!outcome.success);
        assert_eq!(outcome.retry_count, 1);
        assert_eq!(escalation.calls(), 1);
        assert!(outcome.error_message.starts_with("escalation rejected"));
        let history = outcome.metadata["validation_history"]
            .as_array()
            .expect("history");
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn validator_error_is_retried() {
        let generator = ScriptedGenerator::always(sample_document());
        let validator =
            ScriptedValidator::new(vec![Verdict::Error("regex engine exploded"), Verdict::Pass]);
        let escalation = ScriptedEscalation::rejecting("unused");
        let store = MemoryStore::new();
        let orchestrator =
            Orchestrator::new(test_config(3), &generator, &validator, &escalation, &store);

        let outcome = orchestrator.run("story");

        assert!(outcome.success);
        assert_eq!(outcome.retry_count, 1);
        assert_eq!(outcome.transitions[1].trigger, Trigger::ValidationErrored);
    }

    /// Approval without replacement text keeps the failing document.
    #[test]
    fn blank_approval_keeps_current_document() {
        let generator = ScriptedGenerator::always(incomplete_document());
        let validator = ScriptedValidator::from_pattern(&[false]);
        let escalation = ScriptedEscalation::approving(Some("  "));
        let store = MemoryStore::new();
        let orchestrator =
            Orchestrator::new(test_config(0), &generator, &validator, &escalation, &store);

        let outcome = orchestrator.run("story");

        assert!(outcome.success);
        assert!(outcome.escalated);
        assert_eq!(outcome.acceptance_criteria, incomplete_document());
        assert_eq!(outcome.metadata["escalation"]["changes_made"], json!(false));
        assert_eq!(
            store.get("AcceptanceCriteria.md").as_deref(),
            Some(incomplete_document().as_str())
        );
    }

    #[test]
    fn approval_without_any_document_is_an_escalation_error() {
        let generator = ScriptedGenerator::failing("backend down");
        let validator = ScriptedValidator::from_pattern(&[true]);
        let escalation = ScriptedEscalation::approving(None);
        let store = MemoryStore::new();
        let orchestrator =
            Orchestrator::new(test_config(1), &generator, &validator, &escalation, &store);

        let outcome = orchestrator.run("story");

        assert!(!outcome.success);
        assert_eq!(generator.calls(), 2);
        assert_eq!(validator.calls(), 0);
        assert_eq!(
            outcome.error_message,
            "escalation failed: reviewer approved without a document"
        );
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn escalation_sees_failure_context() {
        let generator = ScriptedGenerator::always(incomplete_document());
        let validator = ScriptedValidator::from_pattern(&[false]);
        let escalation = ScriptedEscalation::failing("reviewer unreachable");
        let store = MemoryStore::new();
        let orchestrator =
            Orchestrator::new(test_config(2), &generator, &validator, &escalation, &store);

        let outcome = orchestrator.run("story");

        assert!(!outcome.success);
        assert_eq!(outcome.error_message, "escalation failed: reviewer unreachable");
        let requests = escalation.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].criteria, incomplete_document());
        let context = requests[0].error_context.as_deref().expect("context");
        assert!(context.contains("maximum retries (2)"), "{context}");
        assert_eq!(outcome.metadata["max_retries_exceeded"], json!(true));
        assert_eq!(outcome.failures.len(), 1);
    }

    /// Handlers ignore sessions that are terminal or in another phase.
    #[test]
    fn handlers_are_noops_outside_their_phase() {
        let generator = ScriptedGenerator::always(sample_document());
        let validator = ScriptedValidator::from_pattern(&[true]);
        let escalation = ScriptedEscalation::approving(None);
        let store = MemoryStore::new();
        let orchestrator =
            Orchestrator::new(test_config(3), &generator, &validator, &escalation, &store);
        let budget = budget();

        let mut state = SessionState::new("story");
        assert!(orchestrator.validate(&mut state).is_none());
        assert!(orchestrator.escalate(&mut state, &budget).is_none());
        assert_eq!(state, SessionState::new("story"));

        orchestrator.drive(&mut state, &budget);
        assert!(state.done);
        let finished = state.clone();
        assert!(orchestrator.analyze(&mut state, &budget).is_none());
        assert!(orchestrator.validate(&mut state).is_none());
        assert!(orchestrator.escalate(&mut state, &budget).is_none());
        assert!(orchestrator.step(&mut state, &budget).is_none());
        assert_eq!(state, finished);
        assert_eq!(generator.calls(), 1);
    }

    #[test]
    fn expired_budget_ends_in_escalation_error() {
        let generator = ScriptedGenerator::always(sample_document());
        let validator = ScriptedValidator::from_pattern(&[true]);
        let escalation = ScriptedEscalation::approving(None);
        let store = MemoryStore::new();
        let orchestrator = Orchestrator::new(
            OrchestratorConfig {
                run_timeout: Duration::ZERO,
                ..test_config(1)
            },
            &generator,
            &validator,
            &escalation,
            &store,
        );

        let outcome = orchestrator.run("story");

        assert!(!outcome.success);
        assert_eq!(generator.calls(), 0);
        assert_eq!(escalation.calls(), 0);
        assert_eq!(outcome.retry_count, 1);
        assert_eq!(outcome.error_message, "escalation failed: run timed out");
    }

    #[test]
    fn malformed_payload_is_a_workflow_failure() {
        let generator = ScriptedGenerator::always(sample_document());
        let validator = ScriptedValidator::from_pattern(&[true]);
        let escalation = ScriptedEscalation::approving(None);
        let store = MemoryStore::new();
        let orchestrator =
            Orchestrator::new(test_config(3), &generator, &validator, &escalation, &store);

        let outcome = orchestrator.run_payload(r#"{"story": 1}"#);
        assert!(!outcome.success);
        assert_eq!(outcome.retry_count, 0);
        assert!(outcome.error_message.starts_with("workflow failed:"));
        assert!(outcome.transitions.is_empty());
        assert_eq!(generator.calls(), 0);

        let outcome = orchestrator.run_payload(r#"{"requirements": "story"}"#);
        assert!(outcome.success);
    }

    #[test]
    fn oversized_run_timeout_does_not_overflow() {
        let generator = ScriptedGenerator::always(sample_document());
        let validator = ScriptedValidator::from_pattern(&[true]);
        let escalation = ScriptedEscalation::rejecting("unused");
        let store = MemoryStore::new();
        let cfg = AnalystConfig {
            run_timeout_secs: u64::MAX,
            ..AnalystConfig::default()
        };
        assert!(cfg.validate().is_ok());
        let orchestrator = Orchestrator::new(
            OrchestratorConfig::from(&cfg),
            &generator,
            &validator,
            &escalation,
            &store,
        );

        let outcome = orchestrator.run("story");

        assert!(outcome.success);
        assert_eq!(generator.calls(), 1);
    }

    /// A session stuck in DONE without being terminal cannot be advanced.
    #[test]
    fn stalled_session_is_aborted() {
        let generator = ScriptedGenerator::always(sample_document());
        let validator = ScriptedValidator::from_pattern(&[true]);
        let escalation = ScriptedEscalation::approving(None);
        let store = MemoryStore::new();
        let orchestrator =
            Orchestrator::new(test_config(3), &generator, &validator, &escalation, &store);
        let mut state = SessionState::new("story");
        state.phase = Phase::Done;

        orchestrator.drive(&mut state, &budget());

        assert!(state.done);
        assert!(!state.validation_passed);
        let Some(RunError::Workflow { message }) = &state.error else {
            panic!("expected workflow error, got {:?}", state.error);
        };
        assert_eq!(message, "no handler made progress in phase done");
        assert_eq!(state.transitions.len(), 1);
        assert_eq!(state.transitions[0].trigger, Trigger::Aborted);
        assert_eq!(generator.calls(), 0);
        assert_eq!(state.metadata["failure_kind"], "workflow");
    }

    /// A session that keeps looping past the ceiling is cut off.
    #[test]
    fn runaway_session_is_aborted_at_ceiling() {
        let generator = ScriptedGenerator::always(incomplete_document());
        let validator = ScriptedValidator::from_pattern(&[false]);
        let escalation = ScriptedEscalation::approving(None);
        let store = MemoryStore::new();
        // The retry budget allows more loops than the ceiling being enforced.
        let orchestrator =
            Orchestrator::new(test_config(10), &generator, &validator, &escalation, &store);
        let ceiling = RetryPolicy::new(1).round_ceiling();
        let mut state = SessionState::new("story");

        orchestrator.drive_with_ceiling(&mut state, &budget(), ceiling);

        assert!(state.done);
        let Some(RunError::Workflow { message }) = &state.error else {
            panic!("expected workflow error, got {:?}", state.error);
        };
        assert_eq!(message, "round ceiling 3 exceeded");
        assert_eq!(generator.calls(), ceiling as usize);
        assert_eq!(escalation.calls(), 0);
        let last = state.transitions.last().expect("transition");
        assert_eq!(last.trigger, Trigger::Aborted);
        assert_eq!(last.from, Phase::Analyze);
        assert_eq!(state.retry_count, ceiling);
    }

    #[test]
    fn orchestrator_config_follows_analyst_config() {
        let cfg = AnalystConfig {
            max_retries: 7,
            run_timeout_secs: 12,
            ..AnalystConfig::default()
        };
        let config = OrchestratorConfig::from(&cfg);
        assert_eq!(config.max_retries, 7);
        assert_eq!(config.run_timeout, Duration::from_secs(12));
        assert_eq!(config.output_type, ACCEPTANCE_CRITERIA);
        assert_eq!(config.artifact_name, "AcceptanceCriteria.md");
        assert_eq!(OrchestratorConfig::default().max_retries, 3);
    }
}
