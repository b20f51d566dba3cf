//! Validator abstraction over the structural section checker.

use anyhow::Result;
use tracing::{debug, instrument};

use crate::core::sections::check_sections;
use crate::core::types::ValidationReport;

#[derive(Debug, Clone, Copy)]
pub struct ValidateRequest<'a> {
    pub output_type: &'a str,
    pub text: &'a str,
    pub original_requirements: &'a str,
}

pub trait Validator {
    /// Check a candidate document.
    ///
    /// Structural mismatches are a report with `passed = false`. `Err` is
    /// reserved for the validator itself breaking.
    fn validate(&self, request: &ValidateRequest<'_>) -> Result<ValidationReport>;
}

impl<T: Validator + ?Sized> Validator for &T {
    fn validate(&self, request: &ValidateRequest<'_>) -> Result<ValidationReport> {
        (**self).validate(request)
    }
}

/// Default validator: required-section presence and non-emptiness.
#[derive(Debug, Clone, Copy, Default)]
pub struct SectionValidator;

impl Validator for SectionValidator {
    #[instrument(skip_all, fields(output_type = request.output_type))]
    fn validate(&self, request: &ValidateRequest<'_>) -> Result<ValidationReport> {
        let report = check_sections(request.output_type, request.text);
        debug!(
            passed = report.passed,
            failures = report.details.failures.len(),
            "section check finished"
        );
        Ok(report)
    }
}
