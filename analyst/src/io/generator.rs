//! Generator abstraction for producing acceptance criteria documents.
//!
//! The [`Generator`] trait decouples the orchestrator from the text-generation
//! backend (by default `codex exec`). Tests use scripted generators that return
//! predetermined documents without spawning processes.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, instrument, warn};

use crate::io::process::{command_from_argv, run_with_input};
use crate::io::prompt::{AnalystPrompt, PromptEngine};

/// Parameters for one generation attempt.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub requirements: String,
    /// 1-based attempt number.
    pub attempt: u32,
    /// Failure summary of the previous attempt, fed back into the prompt.
    pub previous_failure: Option<String>,
    /// Maximum time to wait for the backend.
    pub timeout: Duration,
}

/// Abstraction over criteria generation backends.
pub trait Generator {
    /// Produce a criteria document. Errors on empty input or backend failure.
    fn generate(&self, request: &GenerateRequest) -> Result<String>;
}

impl<T: Generator + ?Sized> Generator for &T {
    fn generate(&self, request: &GenerateRequest) -> Result<String> {
        (**self).generate(request)
    }
}

/// Generator that pipes a rendered prompt into a configured command.
pub struct CommandGenerator {
    command: Vec<String>,
    output_limit_bytes: usize,
    prompts: PromptEngine,
}

impl CommandGenerator {
    pub fn new(command: Vec<String>, output_limit_bytes: usize) -> Result<Self> {
        Ok(Self {
            command,
            output_limit_bytes,
            prompts: PromptEngine::new()?,
        })
    }
}

impl Generator for CommandGenerator {
    #[instrument(
        skip_all,
        fields(attempt = request.attempt, timeout_secs = request.timeout.as_secs())
    )]
    fn generate(&self, request: &GenerateRequest) -> Result<String> {
        if request.requirements.trim().is_empty() {
            return Err(anyhow!("requirements are empty"));
        }
        let prompt = self.prompts.render_analyst(&AnalystPrompt {
            requirements: &request.requirements,
            attempt: request.attempt,
            previous_failure: request.previous_failure.as_deref(),
        })?;

        info!(
            program = %self.command.first().map(String::as_str).unwrap_or_default(),
            "starting generator"
        );
        let cmd = command_from_argv(&self.command).context("generator command")?;
        let output = run_with_input(
            cmd,
            prompt.as_bytes(),
            request.timeout,
            self.output_limit_bytes,
        )
        .context("run generator command")?;

        if output.timed_out {
            warn!(
                timeout_secs = request.timeout.as_secs(),
                "generator timed out"
            );
            return Err(anyhow!("generator timed out after {:?}", request.timeout));
        }
        if !output.status.success() {
            warn!(exit_code = ?output.status.code(), "generator failed");
            return Err(anyhow!(
                "generator exited with status {:?}: {}",
                output.status.code(),
                output.diagnostic()
            ));
        }

        let document = output.stdout_text().trim().to_string();
        if document.is_empty() {
            return Err(anyhow!("generator produced no output"));
        }
        debug!(bytes = document.len(), "generator completed successfully");
        Ok(document)
    }
}
