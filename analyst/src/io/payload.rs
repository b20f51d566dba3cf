//! Raw JSON run payloads (`{"requirements": "..."}`).

use std::sync::LazyLock;

use anyhow::{Context, Result, anyhow};
use jsonschema::{Validator, validator_for};
use serde::Deserialize;
use serde_json::Value;

const RUN_PAYLOAD_SCHEMA: &str = include_str!("../../schemas/run_payload.schema.json");

static PAYLOAD_VALIDATOR: LazyLock<Result<Validator, String>> = LazyLock::new(|| {
    let schema: Value = serde_json::from_str(RUN_PAYLOAD_SCHEMA).map_err(|err| err.to_string())?;
    validator_for(&schema).map_err(|err| err.to_string())
});

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunPayload {
    pub requirements: String,
}

/// Parse and schema-check a raw payload.
///
/// Only the shape is checked here; blank requirements are rejected later as an
/// input error by the orchestrator.
pub fn parse_payload(raw: &str) -> Result<RunPayload> {
    let value: Value = serde_json::from_str(raw).context("parse payload json")?;
    let validator = PAYLOAD_VALIDATOR
        .as_ref()
        .map_err(|err| anyhow!("invalid payload schema: {err}"))?;
    if !validator.is_valid(&value) {
        let messages = validator
            .iter_errors(&value)
            .map(|err| err.to_string())
            .collect::<Vec<_>>();
        return Err(anyhow!(
            "payload schema validation failed: {}",
            messages.join("; ")
        ));
    }
    serde_json::from_value(value).context("deserialize payload")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_requirements_string() {
        let payload = parse_payload(r#"{"requirements": "As a user I want to log in"}"#)
            .expect("payload");
        assert_eq!(payload.requirements, "As a user I want to log in");
    }

    #[test]
    fn extra_fields_are_ignored() {
        let payload =
            parse_payload(r#"{"requirements": "story", "source": "jira"}"#).expect("payload");
        assert_eq!(payload.requirements, "story");
    }

    /// Blank requirements are well-formed; rejecting them is the orchestrator's job.
    #[test]
    fn blank_requirements_pass_the_schema() {
        let payload = parse_payload(r#"{"requirements": ""}"#).expect("payload");
        assert!(payload.requirements.is_empty());
    }

    #[test]
    fn rejects_malformed_json() {
        let err = parse_payload("{not json").expect_err("malformed");
        assert!(err.to_string().contains("parse payload json"));
    }

    #[test]
    fn rejects_missing_or_mistyped_requirements() {
        let err = parse_payload(r#"{"story": "x"}"#).expect_err("missing");
        assert!(err.to_string().contains("payload schema validation failed"));
        let err = parse_payload(r#"{"requirements": 42}"#).expect_err("mistyped");
        assert!(err.to_string().contains("payload schema validation failed"));
        assert!(parse_payload("[]").is_err());
    }
}
