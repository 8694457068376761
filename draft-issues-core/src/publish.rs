//! High-level pipeline: checks the tracker, then creates the selected draft issues one by one.
//!
//! This module provides the orchestration for a "publish" run over records parsed from a
//! draft. It:
//!   - Verifies the tracker is installed (and authenticated, unless this is a dry run)
//!   - Walks the selected records strictly in order, one tracker call at a time
//!   - Prints per-issue progress and a closing summary to the given writer
//!   - Returns a [`PublishReport`] with the outcome of every selected issue
//!
//! # Error Handling
//! A failed precondition aborts the run before any issue is touched. A failed create call is
//! recorded in the report and the run moves on to the next issue; there is no retry.
//!
//! # Navigation
//! - Entrypoints: [`preflight`], [`publish`]
//! - Supporting types: [`PublishReport`], [`IssueOutcome`], [`OutcomeStatus`].

use serde::Serialize;
use std::io::Write;
use tracing::{debug, error, info, warn};

use crate::config::{LabelMode, PublishOptions};
use crate::contract::{CreatedIssue, IssueTracker, NewIssue, TrackerError};
use crate::draft::IssueRecord;
use crate::selection::Selection;

const PREVIEW_CHARS: usize = 100;
const RULE_WIDTH: usize = 50;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error(transparent)]
    Preflight(TrackerError),
    #[error("failed to write progress output: {0}")]
    Output(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Created(CreatedIssue),
    /// Dry run: shown but not sent.
    Previewed,
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct IssueOutcome {
    /// 1-based position of the issue in the draft.
    pub index: usize,
    pub title: String,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishReport {
    pub dry_run: bool,
    pub label_mode: LabelMode,
    /// Number of issues in the whole draft, not just the selection.
    pub total: usize,
    pub outcomes: Vec<IssueOutcome>,
}

impl PublishReport {
    pub fn created(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| !matches!(o.status, OutcomeStatus::Failed { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.created()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Check that the tracker can be used.
///
/// A missing tracker is only a warning in dry-run mode. Authentication is not checked at all
/// in dry-run mode since nothing will be sent.
pub async fn preflight<T, W>(tracker: &T, dry_run: bool, out: &mut W) -> Result<(), PublishError>
where
    T: IssueTracker + ?Sized,
    W: Write,
{
    if let Err(e) = tracker.check_installed().await {
        if !dry_run {
            error!(error = %e, "[PUBLISH][ERROR] Issue tracker not installed");
            return Err(PublishError::Preflight(e));
        }
        warn!(error = %e, "[PUBLISH] Issue tracker not installed, continuing dry run");
        writeln!(out, "Warning: {e}")?;
        writeln!(out, "Continuing with dry run anyway...")?;
    }

    if !dry_run {
        if let Err(e) = tracker.check_authenticated().await {
            error!(error = %e, "[PUBLISH][ERROR] Issue tracker not authenticated");
            return Err(PublishError::Preflight(e));
        }
    }

    info!(dry_run, "[PUBLISH] Preflight passed");
    Ok(())
}

/// Banner printed ahead of everything else in a dry run.
pub fn write_dry_run_banner<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(out, "DRY RUN MODE - No issues will be created")?;
    writeln!(out)
}

/// Build the tracker request for a record under the given label mode.
pub fn new_issue(record: &IssueRecord, mode: LabelMode) -> NewIssue {
    match mode {
        LabelMode::Attach => NewIssue {
            title: record.title.clone(),
            body: record.body.clone(),
            labels: record.labels.clone(),
        },
        LabelMode::InBody => {
            let labels = if record.labels.is_empty() {
                "none".to_string()
            } else {
                record.labels.join(", ")
            };
            NewIssue {
                title: record.title.clone(),
                body: format!("**Labels:** {labels}\n\n---\n\n{}", record.body),
                labels: Vec::new(),
            }
        }
    }
}

/// Create the selected records through `tracker`, strictly one after another.
///
/// Progress and the summary are written to `out`. The caller should run [`preflight`] first.
pub async fn publish<T, W>(
    records: &[IssueRecord],
    selection: Selection,
    options: &PublishOptions,
    tracker: &T,
    out: &mut W,
) -> Result<PublishReport, PublishError>
where
    T: IssueTracker + ?Sized,
    W: Write,
{
    let total = records.len();
    let range = selection.range(total);
    let first_index = range.start + 1;
    let selected = &records[range];
    info!(
        total,
        selected = selected.len(),
        dry_run = options.dry_run,
        "[PUBLISH] Starting publish run"
    );

    let mut outcomes = Vec::with_capacity(selected.len());
    let mut tracker_called = false;
    for (pos, record) in selected.iter().enumerate() {
        let index = first_index + pos;

        // The delay only separates two tracker calls.
        let calls_tracker = !options.dry_run && !record.title.is_empty();
        if calls_tracker && tracker_called && !options.delay.is_zero() {
            debug!(delay_ms = options.delay.as_millis() as u64, "[PUBLISH] Waiting before next issue");
            tokio::time::sleep(options.delay).await;
        }
        tracker_called |= calls_tracker;

        writeln!(out, "Issue {index}/{total}: {}", record.title)?;

        let status = publish_one(record, options, tracker, out).await?;
        if let OutcomeStatus::Failed { reason } = &status {
            error!(index, title = %record.title, reason = %reason, "[PUBLISH][ERROR] Issue failed");
        }
        outcomes.push(IssueOutcome {
            index,
            title: record.title.clone(),
            status,
        });
        writeln!(out)?;
    }

    let report = PublishReport {
        dry_run: options.dry_run,
        label_mode: options.label_mode,
        total,
        outcomes,
    };
    write_summary(&report, out)?;

    match serde_json::to_string_pretty(&report) {
        Ok(json) => debug!(json = %json, "[PUBLISH][DEBUG] Publish report as JSON"),
        Err(e) => error!(error = ?e, "[PUBLISH][DEBUG] Failed to serialize publish report"),
    }
    info!(
        created = report.created(),
        failed = report.failed(),
        "[PUBLISH] Publish run finished"
    );
    Ok(report)
}

async fn publish_one<T, W>(
    record: &IssueRecord,
    options: &PublishOptions,
    tracker: &T,
    out: &mut W,
) -> Result<OutcomeStatus, PublishError>
where
    T: IssueTracker + ?Sized,
    W: Write,
{
    if options.dry_run {
        let preview: String = record.body.chars().take(PREVIEW_CHARS).collect();
        writeln!(out, "   Labels: {}", record.labels.join(","))?;
        writeln!(out, "   Body preview: {preview}...")?;
        return Ok(OutcomeStatus::Previewed);
    }

    if record.title.is_empty() {
        writeln!(out, "   Failed: issue has an empty title")?;
        return Ok(OutcomeStatus::Failed {
            reason: "empty title".to_string(),
        });
    }

    let issue = new_issue(record, options.label_mode);
    match tracker.create_issue(&issue).await {
        Ok(created) => {
            match created.number {
                Some(n) => writeln!(out, "   Created: #{n}")?,
                None => writeln!(out, "   Created successfully")?,
            }
            info!(title = %record.title, number = ?created.number, "[PUBLISH] Issue created");
            Ok(OutcomeStatus::Created(created))
        }
        Err(e) => {
            writeln!(out, "   Failed: {e}")?;
            Ok(OutcomeStatus::Failed {
                reason: e.to_string(),
            })
        }
    }
}

fn write_summary<W: Write>(report: &PublishReport, out: &mut W) -> std::io::Result<()> {
    let rule = "-".repeat(RULE_WIDTH);
    writeln!(out, "{rule}")?;
    writeln!(out, "Summary:")?;
    if report.dry_run {
        writeln!(out, "   Previewed: {} issues", report.created())?;
    } else {
        writeln!(out, "   Created: {} issues", report.created())?;
    }
    if report.failed() > 0 {
        writeln!(out, "   Failed: {} issues", report.failed())?;
    }
    writeln!(out, "{rule}")?;

    if report.dry_run {
        writeln!(out)?;
        writeln!(out, "This was a dry run. Run without --dry-run to create issues.")?;
    } else if report.label_mode == LabelMode::InBody {
        writeln!(out)?;
        writeln!(out, "Labels were included in issue descriptions.")?;
        writeln!(out, "   You can add them manually or via GitHub UI later.")?;
    }
    Ok(())
}
