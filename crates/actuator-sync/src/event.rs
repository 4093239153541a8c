use chrono::{DateTime, Utc};
use cultiva_core::{ActuatorFlags, ModeChange, SystemsState};
use serde::Serialize;

use crate::error::{FailureKind, SyncError};

// ─── Failure ──────────────────────────────────────────────────────────────

/// A failed request, kept for diagnostics. Never shown as a blocking error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl Failure {
    pub fn from_error(err: &SyncError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            at: Utc::now(),
        }
    }
}

// ─── WriteReport ──────────────────────────────────────────────────────────

/// Result of one PATCH request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WriteOutcome {
    Sent,
    /// Not issued because the payload was empty.
    Skipped,
    Failed(Failure),
}

impl WriteOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, WriteOutcome::Failed(_))
    }
}

/// Everything a fired debounce timer transmitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WriteReport {
    /// Generation of the `set_mode` call whose timer fired.
    pub generation: u64,
    /// Local state at fire time; both payloads were derived from it.
    pub state: SystemsState,
    pub auto: ActuatorFlags,
    pub active: ActuatorFlags,
    pub auto_outcome: WriteOutcome,
    pub active_outcome: WriteOutcome,
}

impl WriteReport {
    pub fn is_success(&self) -> bool {
        !self.auto_outcome.is_failed() && !self.active_outcome.is_failed()
    }
}

// ─── SyncEvent ────────────────────────────────────────────────────────────

/// Notifications broadcast by [`crate::SyncEngine`].
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncEvent {
    /// A write was (re)scheduled by `set_mode`.
    Scheduled { generation: u64 },
    /// The debounce window elapsed and the writes finished.
    Flushed(WriteReport),
    /// Remote state was fetched and reconciled.
    Refreshed { changes: Vec<ModeChange> },
    RefreshFailed(Failure),
}

// ─── Diagnostics ──────────────────────────────────────────────────────────

/// Running counters and the most recent failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    /// Individual PATCH requests that succeeded.
    pub writes_sent: u64,
    pub writes_failed: u64,
    pub refreshes: u64,
    pub refresh_failures: u64,
    pub last_flush_at: Option<DateTime<Utc>>,
    pub last_refresh_at: Option<DateTime<Utc>>,
    pub last_failure: Option<Failure>,
}

impl Diagnostics {
    pub(crate) fn record_outcome(&mut self, outcome: &WriteOutcome) {
        match outcome {
            WriteOutcome::Sent => self.writes_sent += 1,
            WriteOutcome::Skipped => {}
            WriteOutcome::Failed(f) => {
                self.writes_failed += 1;
                self.last_failure = Some(f.clone());
            }
        }
    }

    pub(crate) fn record_refresh_failure(&mut self, failure: &Failure) {
        self.refresh_failures += 1;
        self.last_failure = Some(failure.clone());
    }
}
