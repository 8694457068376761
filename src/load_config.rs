/// `load_config` module: loads the optional YAML config file and layers it with environment
/// variables and command-line overrides into the effective [`CliConfig`].
///
/// # Precedence
/// built-in defaults, then the YAML file, then the environment (`GH_REPO`), then explicit flags.
///
/// # Errors
/// All errors in this module use `anyhow::Error` for context-rich diagnostics, and are surfaced
/// at the CLI boundary.
///
/// Accepted YAML keys:
///
/// ```yaml
/// repo: owner/name
/// draft_file: ISSUES_DRAFT.md
/// delay_ms: 1000
/// gh_program: gh
/// default_labels: [enhancement]
/// labels_in_body: false
/// ```
use anyhow::Result;
use draft_issues_core::config::{LabelMode, PublishOptions, DEFAULT_DELAY};
use draft_issues_core::draft::DEFAULT_LABELS;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

pub const DEFAULT_DRAFT_FILE: &str = "ISSUES_DRAFT.md";
pub const DEFAULT_GH_PROGRAM: &str = "gh";
pub const REPO_ENV_VAR: &str = "GH_REPO";

/// Contents of the YAML config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub repo: Option<String>,
    pub draft_file: Option<PathBuf>,
    pub delay_ms: Option<u64>,
    pub gh_program: Option<PathBuf>,
    pub default_labels: Option<Vec<String>>,
    pub labels_in_body: Option<bool>,
}

/// Values given explicitly on the command line.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub repo: Option<String>,
    pub draft_file: Option<PathBuf>,
    pub delay_ms: Option<u64>,
    pub gh_program: Option<PathBuf>,
    pub labels_in_body: bool,
    pub dry_run: bool,
}

/// Effective configuration for one CLI invocation.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// `owner/name`; `None` lets `gh` infer the repository from the working directory.
    pub repo: Option<String>,
    pub draft_file: PathBuf,
    pub gh_program: PathBuf,
    pub default_labels: Vec<String>,
    pub publish: PublishOptions,
}

/// Loads a YAML config file. An empty file is the same as no file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<FileConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    if config_content.trim().is_empty() {
        return Ok(FileConfig::default());
    }

    match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            Ok(conf)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}

/// Layers defaults, the optional file config, `GH_REPO` and the command-line overrides.
pub fn resolve_config(file: Option<FileConfig>, overrides: &ConfigOverrides) -> CliConfig {
    let file = file.unwrap_or_default();
    let env_repo = std::env::var(REPO_ENV_VAR)
        .ok()
        .filter(|r| !r.trim().is_empty());

    let repo = overrides.repo.clone().or(env_repo).or(file.repo);
    let draft_file = overrides
        .draft_file
        .clone()
        .or(file.draft_file)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DRAFT_FILE));
    let gh_program = overrides
        .gh_program
        .clone()
        .or(file.gh_program)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_GH_PROGRAM));
    let default_labels = file
        .default_labels
        .unwrap_or_else(|| DEFAULT_LABELS.iter().map(|l| l.to_string()).collect());
    let delay = overrides
        .delay_ms
        .or(file.delay_ms)
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_DELAY);
    let label_mode = if overrides.labels_in_body || file.labels_in_body.unwrap_or(false) {
        LabelMode::InBody
    } else {
        LabelMode::Attach
    };

    let config = CliConfig {
        repo,
        draft_file,
        gh_program,
        default_labels,
        publish: PublishOptions {
            dry_run: overrides.dry_run,
            label_mode,
            delay,
        },
    };
    info!(
        repo = config.repo.as_deref().unwrap_or("<current>"),
        draft_file = %config.draft_file.display(),
        gh_program = %config.gh_program.display(),
        "Config resolved"
    );
    config.publish.trace_loaded();
    config
}
