//! Escalation handlers that hand a failing document to a human reviewer.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, instrument, warn};

use crate::core::types::EscalationDecision;
use crate::io::config::{EscalationConfig, EscalationMode};
use crate::io::process::{command_from_argv, run_with_input};
use crate::io::prompt::{PromptEngine, ReviewPrompt};

const REVIEW_STAGE: &str = "analysis";

#[derive(Debug, Clone)]
pub struct EscalationRequest {
    pub requirements: String,
    pub criteria: String,
    /// Why automation gave up (latest failure summary).
    pub error_context: Option<String>,
    pub output_type: String,
    pub timeout: Duration,
}

pub trait Escalation {
    /// Ask a reviewer for a verdict. `Err` means the review channel failed.
    fn escalate(&self, request: &EscalationRequest) -> Result<EscalationDecision>;
}

impl<T: Escalation + ?Sized> Escalation for &T {
    fn escalate(&self, request: &EscalationRequest) -> Result<EscalationDecision> {
        (**self).escalate(request)
    }
}

/// Used when no reviewer is configured: every escalation is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectEscalation;

impl Escalation for RejectEscalation {
    fn escalate(&self, _request: &EscalationRequest) -> Result<EscalationDecision> {
        debug!("no reviewer configured, rejecting");
        Ok(EscalationDecision::reject(
            "no reviewer configured (escalation.mode = \"reject\")",
        ))
    }
}

/// Reviewer command: receives the review request on stdin.
///
/// Exit 0 approves, with stdout as the replacement document (blank keeps the
/// current one). Any other exit status rejects, with the output as feedback.
pub struct CommandEscalation {
    command: Vec<String>,
    output_limit_bytes: usize,
    prompts: PromptEngine,
}

impl CommandEscalation {
    pub fn new(command: Vec<String>, output_limit_bytes: usize) -> Result<Self> {
        Ok(Self {
            command,
            output_limit_bytes,
            prompts: PromptEngine::new()?,
        })
    }
}

impl Escalation for CommandEscalation {
    #[instrument(skip_all, fields(timeout_secs = request.timeout.as_secs()))]
    fn escalate(&self, request: &EscalationRequest) -> Result<EscalationDecision> {
        let review = self.prompts.render_review(&ReviewPrompt {
            stage: REVIEW_STAGE,
            output_type: &request.output_type,
            requirements: &request.requirements,
            criteria: &request.criteria,
            error_context: request.error_context.as_deref(),
        })?;

        info!("requesting human review");
        let cmd = command_from_argv(&self.command).context("reviewer command")?;
        let output = run_with_input(
            cmd,
            review.as_bytes(),
            request.timeout,
            self.output_limit_bytes,
        )
        .context("run reviewer command")?;

        if output.timed_out {
            warn!(timeout_secs = request.timeout.as_secs(), "reviewer timed out");
            return Err(anyhow!("reviewer timed out after {:?}", request.timeout));
        }
        if output.status.success() {
            let text = output.stdout_text();
            let updated = Some(text.trim().to_string()).filter(|text| !text.is_empty());
            debug!(changes = updated.is_some(), "reviewer approved");
            return Ok(EscalationDecision::approve(updated));
        }

        warn!(exit_code = ?output.status.code(), "reviewer rejected");
        let feedback = output.diagnostic();
        let feedback = if feedback.is_empty() {
            format!("reviewer exited with status {:?}", output.status.code())
        } else {
            feedback
        };
        Ok(EscalationDecision::reject(feedback))
    }
}

/// Escalation handler selected by `escalation.mode`.
pub enum ConfiguredEscalation {
    Reject(RejectEscalation),
    Command(CommandEscalation),
}

impl ConfiguredEscalation {
    pub fn from_config(config: &EscalationConfig, output_limit_bytes: usize) -> Result<Self> {
        match config.mode {
            EscalationMode::Reject => Ok(Self::Reject(RejectEscalation)),
            EscalationMode::Command => Ok(Self::Command(CommandEscalation::new(
                config.command.clone(),
                output_limit_bytes,
            )?)),
        }
    }
}

impl Escalation for ConfiguredEscalation {
    fn escalate(&self, request: &EscalationRequest) -> Result<EscalationDecision> {
        match self {
            Self::Reject(handler) => handler.escalate(request),
            Self::Command(handler) => handler.escalate(request),
        }
    }
}
