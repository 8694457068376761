#![doc = "GitHub CLI integration: implements the core `IssueTracker` trait by shelling out to `gh`."]
//
//! # GitHub CLI tracker
//!
//! [`GhCli`] runs the `gh` binary (or any compatible program given by path) once per call:
//!
//! - `gh --version` to check the tool is installed
//! - `gh auth status` to check it is authenticated
//! - `gh issue create --title T --body B [--repo R] [--label L]...` to create an issue
//!
//! Output is captured. On success the issue URL printed by `gh` is scanned for the issue
//! number; on failure the trimmed stderr becomes the error message.

use async_trait::async_trait;
use draft_issues_core::contract::{CreatedIssue, IssueTracker, NewIssue, TrackerError};
use regex::Regex;
use std::path::PathBuf;
use std::process::Output;
use std::sync::LazyLock;
use tokio::process::Command;

static ISSUE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+/issues/(\d+)").unwrap());
static ISSUE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/issues/(\d+)").unwrap());

pub struct GhCli {
    program: PathBuf,
    repo: Option<String>,
}

impl GhCli {
    pub fn new(program: impl Into<PathBuf>, repo: Option<String>) -> Self {
        let program = program.into();
        tracing::info!(
            program = %program.display(),
            repo = repo.as_deref().unwrap_or("<current>"),
            "Initialized GitHub CLI tracker"
        );
        Self { program, repo }
    }

    /// Arguments for `gh issue create`, without the program name.
    pub fn create_args(&self, issue: &NewIssue) -> Vec<String> {
        let mut args = vec!["issue".to_string(), "create".to_string()];
        if let Some(repo) = &self.repo {
            args.push("--repo".to_string());
            args.push(repo.clone());
        }
        args.push("--title".to_string());
        args.push(issue.title.clone());
        args.push("--body".to_string());
        args.push(issue.body.clone());
        for label in &issue.labels {
            args.push("--label".to_string());
            args.push(label.clone());
        }
        args
    }

    async fn output(&self, args: &[String]) -> Result<Output, std::io::Error> {
        Command::new(&self.program)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
    }
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

/// Pull the issue number and URL out of `gh issue create` stdout.
pub fn parse_created(stdout: &str) -> CreatedIssue {
    let url = ISSUE_URL_RE
        .find(stdout)
        .map(|m| m.as_str().to_string());
    let number = ISSUE_NUMBER_RE
        .captures(stdout)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok());
    CreatedIssue { number, url }
}

#[async_trait]
impl IssueTracker for GhCli {
    async fn check_installed(&self) -> Result<(), TrackerError> {
        match self.output(&["--version".to_string()]).await {
            Ok(out) if out.status.success() => {
                let version = String::from_utf8_lossy(&out.stdout);
                tracing::info!(
                    version = version.lines().next().unwrap_or_default(),
                    "GitHub CLI found"
                );
                Ok(())
            }
            Ok(out) => {
                tracing::error!(status = %out.status, "GitHub CLI version check failed");
                Err(TrackerError::NotInstalled(format!(
                    "`{} --version` exited with {}",
                    self.program.display(),
                    out.status
                )))
            }
            Err(e) => {
                tracing::error!(error = ?e, program = %self.program.display(), "Failed to launch GitHub CLI");
                Err(TrackerError::NotInstalled(format!(
                    "{}: {e}. Install it from https://cli.github.com/",
                    self.program.display()
                )))
            }
        }
    }

    async fn check_authenticated(&self) -> Result<(), TrackerError> {
        let args = ["auth".to_string(), "status".to_string()];
        let out = self.output(&args).await?;
        if out.status.success() {
            tracing::info!("GitHub CLI is authenticated");
            return Ok(());
        }
        tracing::error!(status = %out.status, stderr = %stderr_of(&out), "GitHub CLI not authenticated");
        Err(TrackerError::NotAuthenticated(
            "run `gh auth login` first".to_string(),
        ))
    }

    async fn create_issue(&self, issue: &NewIssue) -> Result<CreatedIssue, TrackerError> {
        tracing::info!(
            title = %issue.title,
            labels = ?issue.labels,
            repo = self.repo.as_deref().unwrap_or("<current>"),
            "Creating issue via GitHub CLI"
        );
        let out = self.output(&self.create_args(issue)).await.map_err(|e| {
            tracing::error!(error = ?e, "Failed to launch gh issue create");
            TrackerError::Spawn(e)
        })?;

        if !out.status.success() {
            let stderr = stderr_of(&out);
            tracing::error!(status = %out.status, stderr = %stderr, "gh issue create failed");
            return Err(TrackerError::CommandFailed {
                status: out.status.to_string(),
                stderr,
            });
        }

        let created = parse_created(&String::from_utf8_lossy(&out.stdout));
        tracing::info!(number = ?created.number, url = ?created.url, "gh issue create succeeded");
        Ok(created)
    }
}
