pub mod controller;
pub mod state;

pub use controller::RecordingController;
pub use state::{RecordingState, RecordingStats, StopReason};
