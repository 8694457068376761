//! # contract: the interface to an external issue tracker
//!
//! This module defines a single trait ([`IssueTracker`]) and the plain data types that flow
//! through it. The production implementation shells out to the GitHub CLI and lives in the
//! binary crate; tests use the generated `MockIssueTracker`.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall` so consumers can generate deterministic mocks for
//!   unit/integration tests. Downstream crates get the mock through the default
//!   `test-export-mocks` feature.
//!
//! ## Errors
//! - All implementor failures map onto [`TrackerError`]. Precondition failures
//!   (`NotInstalled`, `NotAuthenticated`) are fatal for a run; the rest are per-issue.

use async_trait::async_trait;
use serde::Serialize;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

/// The request for one issue, after label-mode adjustments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    /// Labels to attach. Empty when labels were folded into the body.
    pub labels: Vec<String>,
}

/// What the tracker reported back for a created issue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreatedIssue {
    /// Issue number, when the tracker's output contained one.
    pub number: Option<u64>,
    pub url: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("issue tracker CLI is not installed or not runnable: {0}")]
    NotInstalled(String),
    #[error("not authenticated with the issue tracker: {0}")]
    NotAuthenticated(String),
    #[error("failed to launch issue tracker CLI: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("issue tracker CLI exited with {status}: {stderr}")]
    CommandFailed { status: String, stderr: String },
}

/// Trait for creating issues in an external tracker.
///
/// The trait is `Send` + `Sync` and intended for async/await usage; every call is awaited
/// to completion before the publish pipeline moves on.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Fails with [`TrackerError::NotInstalled`] when the tracker cannot be run at all.
    async fn check_installed(&self) -> Result<(), TrackerError>;

    /// Fails with [`TrackerError::NotAuthenticated`] when the tracker has no usable credentials.
    async fn check_authenticated(&self) -> Result<(), TrackerError>;

    /// Create a single issue.
    async fn create_issue(&self, issue: &NewIssue) -> Result<CreatedIssue, TrackerError>;
}
