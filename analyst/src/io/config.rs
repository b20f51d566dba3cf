//! Analyst configuration stored under `.analyst/config.toml`.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::policy::DEFAULT_MAX_RETRIES;

/// Default location of the config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = ".analyst/config.toml";

/// Analyst configuration (TOML).
///
/// Intended to be edited by humans. Missing fields default to the values the
/// pipeline ships with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AnalystConfig {
    /// Automatic regenerations before a failing document goes to a reviewer.
    pub max_retries: u32,

    /// Wall-clock budget in seconds for one run (all collaborator calls).
    pub run_timeout_secs: u64,

    /// Truncate captured child-process output beyond this many bytes.
    pub output_limit_bytes: usize,

    pub artifacts: ArtifactConfig,
    pub generator: GeneratorConfig,
    pub escalation: EscalationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ArtifactConfig {
    /// Directory that receives persisted artifacts.
    pub output_dir: PathBuf,
    /// Logical name (relative path) of the acceptance criteria document.
    pub acceptance_criteria: String,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            acceptance_criteria: "AcceptanceCriteria.md".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Command that reads the prompt on stdin and prints the document on stdout.
    pub command: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            command: vec![
                "codex".to_string(),
                "exec".to_string(),
                "--skip-git-repo-check".to_string(),
                "-".to_string(),
            ],
        }
    }
}

/// How failing documents reach a human reviewer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EscalationMode {
    /// No reviewer is configured; every escalation is rejected.
    #[default]
    Reject,
    /// Run `escalation.command` with the review request on stdin.
    Command,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct EscalationConfig {
    pub mode: EscalationMode,
    /// Reviewer command (e.g. `["./review.sh"]`); required in `command` mode.
    pub command: Vec<String>,
}

impl Default for AnalystConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            run_timeout_secs: 300,
            output_limit_bytes: 200_000,
            artifacts: ArtifactConfig::default(),
            generator: GeneratorConfig::default(),
            escalation: EscalationConfig::default(),
        }
    }
}

impl AnalystConfig {
    pub fn validate(&self) -> Result<()> {
        if self.run_timeout_secs == 0 {
            return Err(anyhow!("run_timeout_secs must be > 0"));
        }
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("output_limit_bytes must be > 0"));
        }
        if self.artifacts.output_dir.as_os_str().is_empty() {
            return Err(anyhow!("artifacts.output_dir must be non-empty"));
        }
        validate_logical_name(&self.artifacts.acceptance_criteria)
            .context("artifacts.acceptance_criteria")?;
        if !is_command(&self.generator.command) {
            return Err(anyhow!("generator.command must be a non-empty array"));
        }
        if self.escalation.mode == EscalationMode::Command && !is_command(&self.escalation.command)
        {
            return Err(anyhow!(
                "escalation.command must be a non-empty array when escalation.mode = \"command\""
            ));
        }
        Ok(())
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }
}

/// Reject artifact names that are empty, absolute, or escape the output dir.
pub fn validate_logical_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(anyhow!("artifact name must be non-empty"));
    }
    let path = Path::new(name);
    let escapes = path
        .components()
        .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(anyhow!(
            "artifact name '{name}' must be a relative path without '..'"
        ));
    }
    Ok(())
}

fn is_command(command: &[String]) -> bool {
    command
        .first()
        .is_some_and(|program| !program.trim().is_empty())
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `AnalystConfig::default()`.
pub fn load_config(path: &Path) -> Result<AnalystConfig> {
    if !path.exists() {
        let cfg = AnalystConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: AnalystConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &AnalystConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, buf)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

/// Write the default config unless one exists (or `force` is set).
///
/// Returns `true` when the file was written.
pub fn init_config(path: &Path, force: bool) -> Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    write_config(path, &AnalystConfig::default())?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_keeps_existing_config_unless_forced() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(DEFAULT_CONFIG_PATH);
        assert!(init_config(&path, false).expect("init"));

        fs::write(&path, "max_retries = 9\n").expect("edit");
        assert!(!init_config(&path, false).expect("init"));
        assert_eq!(load_config(&path).expect("load").max_retries, 9);

        assert!(init_config(&path, true).expect("init"));
        assert_eq!(load_config(&path).expect("load"), AnalystConfig::default());
    }

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, AnalystConfig::default());
        assert_eq!(cfg.max_retries, 3);
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(".analyst/config.toml");
        let cfg = AnalystConfig {
            max_retries: 5,
            escalation: EscalationConfig {
                mode: EscalationMode::Command,
                command: vec!["./review.sh".to_string()],
            },
            ..AnalystConfig::default()
        };
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "max_retries = 1\n[escalation]\nmode = \"reject\"\n").expect("write");
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.max_retries, 1);
        assert_eq!(cfg.artifacts, ArtifactConfig::default());
        assert_eq!(cfg.generator, GeneratorConfig::default());
    }

    #[test]
    fn command_mode_requires_a_reviewer_command() {
        let cfg = AnalystConfig {
            escalation: EscalationConfig {
                mode: EscalationMode::Command,
                command: Vec::new(),
            },
            ..AnalystConfig::default()
        };
        let err = cfg.validate().expect_err("invalid");
        assert!(err.to_string().contains("escalation.command"));
    }

    #[test]
    fn rejects_zero_timeout_and_empty_generator() {
        let cfg = AnalystConfig {
            run_timeout_secs: 0,
            ..AnalystConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = AnalystConfig {
            generator: GeneratorConfig {
                command: vec![" ".to_string()],
            },
            ..AnalystConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn logical_names_stay_inside_output_dir() {
        assert!(validate_logical_name("AcceptanceCriteria.md").is_ok());
        assert!(validate_logical_name("stories/login.md").is_ok());
        assert!(validate_logical_name("../escape.md").is_err());
        assert!(validate_logical_name("/etc/passwd").is_err());
        assert!(validate_logical_name("").is_err());
    }
}
