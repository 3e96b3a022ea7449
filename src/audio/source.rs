use async_trait::async_trait;

use super::capture::WorkerChannels;
use crate::error::CaptureError;

/// Properties of an opened input stream.
#[derive(Debug, Clone)]
pub struct StreamInfo {
    /// Device name as reported by the platform
    pub device: String,
    /// Native sample rate of the stream in Hz
    pub sample_rate: u32,
    /// Channel count of the raw device stream (downmixed to mono before
    /// reaching the capture worker)
    pub channels: u16,
}

/// Audio input seam
///
/// Implementations own the platform stream and drive a
/// [`CaptureWorker`](super::capture::CaptureWorker) from its callback.
/// The controller only ever talks to this trait, which keeps the state
/// machine testable without an audio device.
#[async_trait]
pub trait AudioSource: Send {
    /// Acquire the input device and start delivering frames to a capture
    /// worker wired to the given channels.
    ///
    /// The worker is sized from the device's native sample rate, so it is
    /// constructed here rather than by the caller.
    async fn start(&mut self, channels: WorkerChannels) -> Result<StreamInfo, CaptureError>;

    /// Tear down the stream. Safe to call when not capturing.
    async fn stop(&mut self) -> Result<(), CaptureError>;

    /// Check if the source is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get source name for logging
    fn name(&self) -> &str;
}
