//! Error types for the capture and transport subsystems

use thiserror::Error;

/// Errors raised while acquiring or running the microphone stream.
///
/// All of these are fatal to the start attempt: the controller rolls back
/// any resources it already holds and returns to `Idle`.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("microphone unavailable: {0}")]
    MicrophoneAccess(String),

    #[error("failed to read device configuration: {0}")]
    DeviceConfig(String),

    #[error("failed to build audio stream: {0}")]
    StreamBuild(String),

    #[error("failed to start audio stream: {0}")]
    StreamPlay(String),
}

/// Errors raised by the session transport.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Session creation failed. Fatal to the start attempt.
    #[error("failed to create recognition session: {0}")]
    SessionCreate(String),

    /// A single chunk upload failed. Non-fatal: the chunk is dropped and
    /// recording continues.
    #[error("chunk upload failed (session {session_id}, seq {sequence}): {reason}")]
    ChunkUpload {
        session_id: String,
        sequence: u32,
        reason: String,
    },
}
