//! Scripted collaborators and fixtures for orchestrator tests.
//!
//! Every double records the requests it saw. Scripts repeat their last entry
//! once exhausted, so a single-entry script behaves like "always".

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tempfile::TempDir;

use crate::core::types::{
    ACCEPTANCE_CRITERIA, EscalationDecision, SectionFailure, ValidationDetails, ValidationReport,
};
use crate::io::artifact::ArtifactStore;
use crate::io::config::{AnalystConfig, DEFAULT_CONFIG_PATH, write_config};
use crate::io::escalation::{Escalation, EscalationRequest};
use crate::io::generator::{GenerateRequest, Generator};
use crate::io::validator::{ValidateRequest, Validator};
use crate::orchestrator::OrchestratorConfig;

/// A complete acceptance criteria document that passes the section checker.
pub fn sample_document() -> String {
    "\
# Acceptance Criteria

## User Story
As a registered user, I want to reset my password so that I can regain access.

## Functional Acceptance Criteria
1. Given a registered email, a reset link is sent within one minute.
2. Given an expired link, the user is asked to request a new one.

## Non-Functional Acceptance Criteria
1. Reset links expire after 30 minutes.

## Validation Methods
- Integration test against the reset endpoint.

## Open Questions
- None
"
    .to_string()
}

/// A document missing every section after the user story.
pub fn incomplete_document() -> String {
    "# Acceptance Criteria\n\n## User Story\nAs a user, I want things.\n".to_string()
}

/// Orchestrator settings with a generous timeout and the given retry budget.
pub fn test_config(max_retries: u32) -> OrchestratorConfig {
    OrchestratorConfig {
        max_retries,
        run_timeout: Duration::from_secs(60),
        ..OrchestratorConfig::default()
    }
}

pub fn passing_report() -> ValidationReport {
    ValidationReport {
        passed: true,
        reason: "Validation successful".to_string(),
        details: ValidationDetails {
            output_type: ACCEPTANCE_CRITERIA.to_string(),
            sections: Vec::new(),
            failures: Vec::new(),
        },
    }
}

/// A failed report listing one missing section.
pub fn failing_report(section: &str) -> ValidationReport {
    let reason = format!("Missing required section: {section}");
    ValidationReport {
        passed: false,
        reason: format!("Validation failed:\n- {reason}"),
        details: ValidationDetails {
            output_type: ACCEPTANCE_CRITERIA.to_string(),
            sections: Vec::new(),
            failures: vec![SectionFailure {
                section: section.to_string(),
                reason,
                expected_format: None,
                line_number: None,
            }],
        },
    }
}

struct Script<T> {
    entries: Vec<T>,
    next: usize,
}

impl<T: Clone> Script<T> {
    fn new(entries: Vec<T>) -> Self {
        Self { entries, next: 0 }
    }

    fn pop(&mut self) -> Option<T> {
        let index = self.next.min(self.entries.len().checked_sub(1)?);
        self.next += 1;
        self.entries.get(index).cloned()
    }
}

/// Generator that returns scripted documents (`Ok`) or failures (`Err`).
pub struct ScriptedGenerator {
    script: RefCell<Script<Result<String, String>>>,
    requests: RefCell<Vec<GenerateRequest>>,
}

impl ScriptedGenerator {
    pub fn new(outputs: Vec<Result<String, String>>) -> Self {
        Self {
            script: RefCell::new(Script::new(outputs)),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn always(document: impl Into<String>) -> Self {
        Self::new(vec![Ok(document.into())])
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(vec![Err(message.into())])
    }

    pub fn calls(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.borrow().clone()
    }
}

impl Generator for ScriptedGenerator {
    fn generate(&self, request: &GenerateRequest) -> Result<String> {
        self.requests.borrow_mut().push(request.clone());
        match self.script.borrow_mut().pop() {
            Some(Ok(document)) => Ok(document),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("generator script is empty")),
        }
    }
}

/// One scripted validator verdict.
#[derive(Debug, Clone)]
pub enum Verdict {
    Pass,
    /// Fail with the named section missing.
    Fail(&'static str),
    /// The validator itself errors.
    Error(&'static str),
}

/// Validator that returns scripted verdicts regardless of the document.
pub struct ScriptedValidator {
    script: RefCell<Script<Verdict>>,
    seen: RefCell<Vec<String>>,
}

impl ScriptedValidator {
    pub fn new(verdicts: Vec<Verdict>) -> Self {
        Self {
            script: RefCell::new(Script::new(verdicts)),
            seen: RefCell::new(Vec::new()),
        }
    }

    /// `true` passes, `false` fails with `open_questions` missing.
    pub fn from_pattern(pattern: &[bool]) -> Self {
        Self::new(
            pattern
                .iter()
                .map(|passed| {
                    if *passed {
                        Verdict::Pass
                    } else {
                        Verdict::Fail("open_questions")
                    }
                })
                .collect(),
        )
    }

    pub fn calls(&self) -> usize {
        self.seen.borrow().len()
    }

    /// Documents passed to the validator, in call order.
    pub fn seen(&self) -> Vec<String> {
        self.seen.borrow().clone()
    }
}

impl Validator for ScriptedValidator {
    fn validate(&self, request: &ValidateRequest<'_>) -> Result<ValidationReport> {
        self.seen.borrow_mut().push(request.text.to_string());
        match self.script.borrow_mut().pop() {
            Some(Verdict::Pass) => Ok(passing_report()),
            Some(Verdict::Fail(section)) => Ok(failing_report(section)),
            Some(Verdict::Error(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("validator script is empty")),
        }
    }
}

/// Escalation handler that returns scripted decisions (`Err` = channel failure).
pub struct ScriptedEscalation {
    script: RefCell<Script<Result<EscalationDecision, String>>>,
    requests: RefCell<Vec<EscalationRequest>>,
}

impl ScriptedEscalation {
    pub fn new(decisions: Vec<Result<EscalationDecision, String>>) -> Self {
        Self {
            script: RefCell::new(Script::new(decisions)),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn approving(updated_text: Option<&str>) -> Self {
        Self::new(vec![Ok(EscalationDecision::approve(
            updated_text.map(str::to_string),
        ))])
    }

    pub fn rejecting(feedback: &str) -> Self {
        Self::new(vec![Ok(EscalationDecision::reject(feedback))])
    }

    pub fn failing(message: &str) -> Self {
        Self::new(vec![Err(message.to_string())])
    }

    pub fn calls(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn requests(&self) -> Vec<EscalationRequest> {
        self.requests.borrow().clone()
    }
}

impl Escalation for ScriptedEscalation {
    fn escalate(&self, request: &EscalationRequest) -> Result<EscalationDecision> {
        self.requests.borrow_mut().push(request.clone());
        match self.script.borrow_mut().pop() {
            Some(Ok(decision)) => Ok(decision),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("escalation script is empty")),
        }
    }
}

/// In-memory artifact store, optionally failing every write.
#[derive(Default)]
pub struct MemoryStore {
    artifacts: RefCell<BTreeMap<String, String>>,
    writes: RefCell<u32>,
    fail_with: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn get(&self, logical_name: &str) -> Option<String> {
        self.artifacts.borrow().get(logical_name).cloned()
    }

    pub fn writes(&self) -> u32 {
        *self.writes.borrow()
    }
}

impl ArtifactStore for MemoryStore {
    fn persist(&self, content: &str, logical_name: &str) -> Result<()> {
        *self.writes.borrow_mut() += 1;
        if let Some(message) = &self.fail_with {
            return Err(anyhow!(message.clone()));
        }
        self.artifacts
            .borrow_mut()
            .insert(logical_name.to_string(), content.to_string());
        Ok(())
    }
}

/// Temporary working directory for CLI tests.
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create temp workspace")?;
        Ok(Self { dir })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.root().join(DEFAULT_CONFIG_PATH)
    }

    pub fn write_config(&self, cfg: &AnalystConfig) -> Result<PathBuf> {
        let path = self.config_path();
        write_config(&path, cfg)?;
        Ok(path)
    }

    pub fn write_file(&self, relative: &str, contents: &str) -> Result<PathBuf> {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create directory {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }

    pub fn read_file(&self, relative: &str) -> Result<String> {
        let path = self.root().join(relative);
        fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))
    }
}
