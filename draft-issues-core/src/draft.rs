//! Parsing of the issue draft document.
//!
//! A draft is free-form markdown in which every planned issue starts with a heading of the
//! form `### Issue #12: Some title`. Inside an issue's section two markers are recognised:
//!
//! ```markdown
//! **Labels:** `bug`, `priority: high`
//!
//! **Description:**
//!
//! Everything up to the next `---` line is the issue body.
//! ```
//!
//! Anything before the first issue heading is document preamble and ignored.

use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, error, info, warn};

/// Labels given to an issue whose section has no `**Labels:**` line.
pub const DEFAULT_LABELS: &[&str] = &["enhancement"];

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^### Issue #\d+:[ \t](.*)\n").unwrap());
static LABELS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*Labels:\*\*\s+(.+)").unwrap());
static BACKTICK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());
static DESCRIPTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\*\*Description:\*\*\s*\n\n(.+?)(?:\n---\n|$)").unwrap());

/// One planned issue, as parsed from the draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueRecord {
    pub title: String,
    pub labels: Vec<String>,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    #[error("failed to read draft file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read and parse the draft at `path`.
pub fn load_draft<P: AsRef<Path>>(
    path: P,
    default_labels: &[String],
) -> Result<Vec<IssueRecord>, DraftError> {
    let path_ref = path.as_ref();
    info!(draft_path = ?path_ref, "Loading issue draft");

    let content = fs::read_to_string(path_ref).map_err(|e| {
        error!(error = ?e, draft_path = ?path_ref, "Failed to read draft file");
        DraftError::Read {
            path: path_ref.to_path_buf(),
            source: e,
        }
    })?;

    let records = parse_draft_with_defaults(&content, default_labels);
    info!(draft_path = ?path_ref, issues = records.len(), "Parsed issue draft");
    Ok(records)
}

/// Parse a draft using [`DEFAULT_LABELS`] for issues without a labels line.
pub fn parse_draft(content: &str) -> Vec<IssueRecord> {
    let defaults: Vec<String> = DEFAULT_LABELS.iter().map(|l| l.to_string()).collect();
    parse_draft_with_defaults(content, &defaults)
}

/// Parse a draft into one record per issue heading, in document order.
pub fn parse_draft_with_defaults(content: &str, default_labels: &[String]) -> Vec<IssueRecord> {
    let content = content.replace("\r\n", "\n");
    let headings: Vec<_> = HEADING_RE.captures_iter(&content).collect();

    let mut records = Vec::with_capacity(headings.len());
    for (i, caps) in headings.iter().enumerate() {
        let (Some(whole), Some(title)) = (caps.get(0), caps.get(1)) else {
            continue;
        };

        let section_start = whole.end();
        let section_end = headings
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(content.len());
        let section = &content[section_start..section_end];

        let title = title.as_str().trim().to_string();
        let labels = extract_labels(section).unwrap_or_else(|| {
            debug!(title = %title, "No labels line, using defaults");
            default_labels.to_vec()
        });
        let body = extract_body(section);
        if title.is_empty() {
            warn!(position = i + 1, "Issue heading has an empty title");
        }

        records.push(IssueRecord {
            title,
            labels,
            body,
        });
    }
    records
}

/// Backtick-quoted tokens on the first `**Labels:**` line, or `None` when there is no such line.
fn extract_labels(section: &str) -> Option<Vec<String>> {
    let line = LABELS_RE.captures(section)?.get(1)?.as_str();
    Some(
        BACKTICK_RE
            .captures_iter(line)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|l| !l.is_empty())
            .collect(),
    )
}

fn extract_body(section: &str) -> String {
    if let Some(desc) = DESCRIPTION_RE.captures(section).and_then(|c| c.get(1)) {
        return desc.as_str().trim().to_string();
    }
    // No description marker: skip the title-ish first two paragraphs.
    match section.splitn(3, "\n\n").nth(2) {
        Some(rest) => rest.trim().to_string(),
        None => section.trim().to_string(),
    }
}
