//! Prompt and review-request rendering.

use anyhow::{Context, Result};
use minijinja::{Environment, context};

use crate::core::sections::required_headings;

const ANALYST_TEMPLATE: &str = include_str!("prompts/analyst.md");
const REVIEW_TEMPLATE: &str = include_str!("prompts/review.md");

/// Inputs for one generation attempt.
#[derive(Debug, Clone, Copy)]
pub struct AnalystPrompt<'a> {
    pub requirements: &'a str,
    /// 1-based attempt number.
    pub attempt: u32,
    /// Itemized failures of the previous attempt, if any.
    pub previous_failure: Option<&'a str>,
}

/// Inputs for a human review request.
#[derive(Debug, Clone, Copy)]
pub struct ReviewPrompt<'a> {
    pub stage: &'a str,
    pub output_type: &'a str,
    pub requirements: &'a str,
    pub criteria: &'a str,
    pub error_context: Option<&'a str>,
}

/// Template engine wrapper around minijinja.
pub struct PromptEngine {
    env: Environment<'static>,
}

impl PromptEngine {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template("analyst", ANALYST_TEMPLATE)
            .context("load analyst template")?;
        env.add_template("review", REVIEW_TEMPLATE)
            .context("load review template")?;
        Ok(Self { env })
    }

    pub fn render_analyst(&self, input: &AnalystPrompt<'_>) -> Result<String> {
        let headings: Vec<&str> = required_headings().collect();
        let template = self.env.get_template("analyst")?;
        let rendered = template
            .render(context! {
                headings => headings,
                requirements => input.requirements.trim(),
                attempt => input.attempt,
                previous_failure => input.previous_failure.map(str::trim).filter(|s| !s.is_empty()),
            })
            .context("render analyst prompt")?;
        Ok(rendered)
    }

    pub fn render_review(&self, input: &ReviewPrompt<'_>) -> Result<String> {
        let template = self.env.get_template("review")?;
        let rendered = template
            .render(context! {
                stage => input.stage,
                output_type => input.output_type,
                requirements => input.requirements.trim(),
                criteria => input.criteria.trim(),
                error_context => input.error_context.map(str::trim).filter(|s| !s.is_empty()),
            })
            .context("render review request")?;
        Ok(rendered)
    }
}
