//! Structural section checker for acceptance criteria documents.
//!
//! Headings are matched case-insensitively on trimmed lines. A section's body
//! is every non-blank line after its heading up to the next `##` heading.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::types::{
    ACCEPTANCE_CRITERIA, SectionFailure, SectionFinding, ValidationDetails, ValidationReport,
};

struct SectionSpec {
    key: &'static str,
    pattern: &'static str,
    heading: &'static str,
}

const ACCEPTANCE_CRITERIA_SECTIONS: &[SectionSpec] = &[
    SectionSpec {
        key: "acceptance_criteria_heading",
        pattern: r"^#\s*acceptance criteria",
        heading: "# Acceptance Criteria",
    },
    SectionSpec {
        key: "user_story",
        pattern: r"^##\s*user story",
        heading: "## User Story",
    },
    SectionSpec {
        key: "functional_criteria",
        pattern: r"^##\s*functional acceptance criteria",
        heading: "## Functional Acceptance Criteria",
    },
    SectionSpec {
        key: "non_functional_criteria",
        pattern: r"^##\s*non-functional acceptance criteria",
        heading: "## Non-Functional Acceptance Criteria",
    },
    SectionSpec {
        key: "validation_methods",
        pattern: r"^##\s*validation methods",
        heading: "## Validation Methods",
    },
    SectionSpec {
        key: "open_questions",
        pattern: r"^##\s*open questions",
        heading: "## Open Questions",
    },
];

static SECTION_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ACCEPTANCE_CRITERIA_SECTIONS
        .iter()
        .map(|spec| Regex::new(spec.pattern).expect("section pattern should be valid"))
        .collect()
});

/// Headings the generator must produce, in document order.
pub fn required_headings() -> impl Iterator<Item = &'static str> {
    ACCEPTANCE_CRITERIA_SECTIONS.iter().map(|spec| spec.heading)
}

/// Check `text` for the sections required by `output_type`.
pub fn check_sections(output_type: &str, text: &str) -> ValidationReport {
    if output_type != ACCEPTANCE_CRITERIA {
        let reason = format!("Unknown output type: {output_type}");
        return ValidationReport {
            passed: false,
            reason: reason.clone(),
            details: ValidationDetails {
                output_type: output_type.to_string(),
                sections: Vec::new(),
                failures: vec![SectionFailure {
                    section: "output_type".to_string(),
                    reason,
                    expected_format: Some(ACCEPTANCE_CRITERIA.to_string()),
                    line_number: None,
                }],
            },
        };
    }

    let lines: Vec<&str> = text.lines().collect();
    let sections: Vec<SectionFinding> = ACCEPTANCE_CRITERIA_SECTIONS
        .iter()
        .zip(SECTION_RES.iter())
        .map(|(spec, re)| find_section(spec, re, &lines))
        .collect();

    let failures: Vec<SectionFailure> = sections.iter().filter_map(section_failure).collect();
    let passed = failures.is_empty();
    let reason = if passed {
        "Validation successful".to_string()
    } else {
        let items: Vec<String> = failures
            .iter()
            .map(|failure| format!("- {}", failure.reason))
            .collect();
        format!("Validation failed:\n{}", items.join("\n"))
    };

    ValidationReport {
        passed,
        reason,
        details: ValidationDetails {
            output_type: output_type.to_string(),
            sections,
            failures,
        },
    }
}

fn find_section(spec: &SectionSpec, re: &Regex, lines: &[&str]) -> SectionFinding {
    let heading = lines
        .iter()
        .position(|line| re.is_match(&line.trim().to_lowercase()));
    let Some(index) = heading else {
        return SectionFinding {
            section: spec.key.to_string(),
            found: false,
            line_number: None,
            content_lines: 0,
        };
    };

    // The top-level heading is its own content.
    let content_lines = if spec.heading.starts_with("##") {
        lines[index + 1..]
            .iter()
            .take_while(|line| !line.trim_start().starts_with("##"))
            .filter(|line| !line.trim().is_empty())
            .count()
    } else {
        1
    };

    SectionFinding {
        section: spec.key.to_string(),
        found: true,
        line_number: Some(index + 1),
        content_lines,
    }
}

fn section_failure(finding: &SectionFinding) -> Option<SectionFailure> {
    if !finding.found {
        let heading = ACCEPTANCE_CRITERIA_SECTIONS
            .iter()
            .find(|spec| spec.key == finding.section)
            .map(|spec| spec.heading.to_string());
        return Some(SectionFailure {
            section: finding.section.clone(),
            reason: format!("Missing required section: {}", finding.section),
            expected_format: heading,
            line_number: None,
        });
    }
    if finding.content_lines == 0 {
        return Some(SectionFailure {
            section: finding.section.clone(),
            reason: format!("Section {} is empty", finding.section),
            expected_format: None,
            line_number: finding.line_number,
        });
    }
    None
}
