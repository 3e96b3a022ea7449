use chrono::{DateTime, Utc};
use serde::Serialize;

/// Lifecycle of the single process-wide recording.
///
/// Owned exclusively by the controller; concurrent recordings are
/// unsupported by design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingState {
    Idle,
    Starting,
    Active,
    Stopping,
}

impl RecordingState {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordingState::Idle => "idle",
            RecordingState::Starting => "starting",
            RecordingState::Active => "active",
            RecordingState::Stopping => "stopping",
        }
    }
}

/// Why a recording is being stopped. All reasons run the same cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The user toggled recording off
    UserToggle,
    /// The backend delivered a finished transcript
    Finished,
    /// The process is going away (interrupt, hangup, terminate)
    Shutdown,
}

impl StopReason {
    pub fn as_str(self) -> &'static str {
        match self {
            StopReason::UserToggle => "user-toggle",
            StopReason::Finished => "finished",
            StopReason::Shutdown => "shutdown",
        }
    }
}

/// Final statistics for one recording, logged on teardown.
#[derive(Debug, Clone, Serialize)]
pub struct RecordingStats {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub duration_secs: f64,
    pub chunks_uploaded: usize,
}
