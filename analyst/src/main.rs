//! Requirements analyst CLI.
//!
//! `analyst run` turns requirements into a validated acceptance criteria
//! document, retrying and escalating as configured in `.analyst/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use analyst::core::sections::check_sections;
use analyst::core::types::{ACCEPTANCE_CRITERIA, RunOutcome, ValidationReport};
use analyst::error::RunError;
use analyst::exit_codes;
use analyst::io::config::{DEFAULT_CONFIG_PATH, init_config, load_config};
use analyst::logging;
use analyst::orchestrator::ConfiguredOrchestrator;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "analyst",
    version,
    about = "Generate validated acceptance criteria from requirements"
)]
struct Cli {
    /// Config file (missing file means defaults).
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Debug logging for the analyst crate (overridden by `RUST_LOG`).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the config file with default values.
    Init {
        /// Overwrite an existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Generate, validate, retry, and escalate until the run finishes.
    Run {
        #[command(flatten)]
        input: RunInput,

        /// Also write the JSON result to this file.
        #[arg(long)]
        report: Option<PathBuf>,

        /// Override `max_retries` from the config.
        #[arg(long)]
        max_retries: Option<u32>,
    },
    /// Check a document for the required sections.
    Check {
        file: PathBuf,

        #[arg(long, default_value = ACCEPTANCE_CRITERIA)]
        output_type: String,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct RunInput {
    /// Read requirements from a file.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Requirements given inline.
    #[arg(long)]
    text: Option<String>,

    /// Raw JSON payload: `{"requirements": "..."}`.
    #[arg(long)]
    payload: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let code = match dispatch(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_codes::INVALID
        }
    };
    std::process::exit(code);
}

fn dispatch(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Init { force } => cmd_init(&cli.config, force),
        Command::Run {
            input,
            report,
            max_retries,
        } => cmd_run(&cli.config, &input, report.as_deref(), max_retries),
        Command::Check { file, output_type } => cmd_check(&file, &output_type),
    }
}

fn cmd_init(config_path: &Path, force: bool) -> Result<i32> {
    if init_config(config_path, force)? {
        println!("wrote {}", config_path.display());
    } else {
        println!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }
    Ok(exit_codes::OK)
}

fn cmd_run(
    config_path: &Path,
    input: &RunInput,
    report_path: Option<&Path>,
    max_retries: Option<u32>,
) -> Result<i32> {
    let mut cfg = load_config(config_path)?;
    if let Some(max_retries) = max_retries {
        cfg.max_retries = max_retries;
    }
    let orchestrator = ConfiguredOrchestrator::from_config(&cfg, Path::new("."))?;

    let outcome = match (&input.file, &input.text, &input.payload) {
        (Some(path), _, _) => {
            let requirements = fs::read_to_string(path)
                .with_context(|| format!("read requirements {}", path.display()))?;
            orchestrator.run(&requirements)
        }
        (None, Some(text), _) => orchestrator.run(text),
        (None, None, Some(payload)) => orchestrator.run_payload(payload),
        (None, None, None) => anyhow::bail!("one of --file, --text, --payload is required"),
    };

    let mut json = serde_json::to_string_pretty(&outcome).context("serialize run result")?;
    json.push('\n');
    if let Some(path) = report_path {
        write_report(path, &json)?;
    }
    print!("{json}");
    debug!(success = outcome.success, "run command finished");
    Ok(run_exit_code(&outcome))
}

fn run_exit_code(outcome: &RunOutcome) -> i32 {
    match &outcome.error {
        _ if outcome.success => exit_codes::OK,
        Some(RunError::Input { .. }) => exit_codes::INVALID,
        _ => exit_codes::FAILED,
    }
}

fn write_report(path: &Path, json: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create report dir {}", parent.display()))?;
        }
    }
    fs::write(path, json).with_context(|| format!("write report {}", path.display()))
}

fn cmd_check(file: &Path, output_type: &str) -> Result<i32> {
    let text = fs::read_to_string(file).with_context(|| format!("read {}", file.display()))?;
    let report = check_sections(output_type, &text);
    print!("{}", render_check(&report));
    if report.passed {
        Ok(exit_codes::OK)
    } else {
        Ok(exit_codes::FAILED)
    }
}

/// Human-readable check result, one failure per line.
fn render_check(report: &ValidationReport) -> String {
    if report.passed {
        return "Validation successful\n".to_string();
    }
    let mut out = String::from("Validation failed:\n");
    for failure in &report.details.failures {
        out.push_str("- ");
        out.push_str(&failure.reason);
        if let Some(expected) = &failure.expected_format {
            out.push_str(&format!(" (expected `{expected}`)"));
        }
        if let Some(line) = failure.line_number {
            out.push_str(&format!(" (line {line})"));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use analyst::test_support::{incomplete_document, sample_document};

    #[test]
    fn parse_init() {
        let cli = Cli::parse_from(["analyst", "init"]);
        assert!(matches!(cli.command, Command::Init { force: false }));
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn parse_init_force_with_global_flags() {
        let cli = Cli::parse_from(["analyst", "init", "--force", "--config", "x.toml", "-v"]);
        assert!(matches!(cli.command, Command::Init { force: true }));
        assert_eq!(cli.config, PathBuf::from("x.toml"));
        assert!(cli.verbose);
    }

    #[test]
    fn parse_run_with_text() {
        let cli = Cli::parse_from([
            "analyst",
            "run",
            "--text",
            "As a user I want to log in",
            "--max-retries",
            "1",
            "--report",
            "out/report.json",
        ]);
        let Command::Run {
            input,
            report,
            max_retries,
        } = cli.command
        else {
            panic!("expected run");
        };
        assert_eq!(input.text.as_deref(), Some("As a user I want to log in"));
        assert!(input.file.is_none());
        assert_eq!(max_retries, Some(1));
        assert_eq!(report, Some(PathBuf::from("out/report.json")));
    }

    #[test]
    fn run_requires_exactly_one_input() {
        assert!(Cli::try_parse_from(["analyst", "run"]).is_err());
        assert!(
            Cli::try_parse_from(["analyst", "run", "--text", "a", "--file", "b.md"]).is_err()
        );
    }

    #[test]
    fn parse_check_defaults_output_type() {
        let cli = Cli::parse_from(["analyst", "check", "AcceptanceCriteria.md"]);
        let Command::Check { file, output_type } = cli.command else {
            panic!("expected check");
        };
        assert_eq!(file, PathBuf::from("AcceptanceCriteria.md"));
        assert_eq!(output_type, ACCEPTANCE_CRITERIA);
    }

    #[test]
    fn render_check_lists_expected_headings() {
        let rendered = render_check(&check_sections(ACCEPTANCE_CRITERIA, &incomplete_document()));
        assert!(rendered.starts_with("Validation failed:\n"));
        assert!(rendered.contains(
            "- Missing required section: functional_criteria (expected `## Functional Acceptance Criteria`)"
        ));
        assert_eq!(
            render_check(&check_sections(ACCEPTANCE_CRITERIA, &sample_document())),
            "Validation successful\n"
        );
    }

    #[test]
    fn input_errors_map_to_invalid() {
        let outcome = RunOutcome::workflow_failure("bad payload");
        assert_eq!(run_exit_code(&outcome), exit_codes::FAILED);

        let mut outcome = RunOutcome::workflow_failure("x");
        outcome.error = Some(RunError::input("requirements must not be empty"));
        assert_eq!(run_exit_code(&outcome), exit_codes::INVALID);
    }
}
