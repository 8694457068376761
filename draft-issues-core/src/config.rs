use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

/// Pause between two consecutive create calls, to stay clear of the tracker's rate limits.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

/// How a record's labels reach the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelMode {
    /// Pass every label to the tracker as a real label.
    #[default]
    Attach,
    /// Leave the issue unlabelled and write the labels at the top of the body instead.
    /// Useful when the labels do not exist in the target repository yet.
    InBody,
}

/// Options for a single publish run.
#[derive(Debug, Clone)]
pub struct PublishOptions {
    pub dry_run: bool,
    pub label_mode: LabelMode,
    pub delay: Duration,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            label_mode: LabelMode::default(),
            delay: DEFAULT_DELAY,
        }
    }
}

impl PublishOptions {
    pub fn trace_loaded(&self) {
        info!(
            dry_run = self.dry_run,
            label_mode = ?self.label_mode,
            delay_ms = self.delay.as_millis() as u64,
            "Loaded PublishOptions"
        );
        debug!(?self, "PublishOptions loaded (full debug)");
    }
}
