//! Capture worker
//!
//! Bridges the platform's periodic audio callback into the chunk buffer.
//! The worker runs entirely on the audio thread: it converts each incoming
//! sample, accumulates chunks, and hands completed chunks to the upload
//! side over a bounded channel without ever blocking. Control messages
//! travel the other way on a second channel.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{TryRecvError, TrySendError};
use tracing::{debug, warn};

use super::chunk::{AudioChunk, ChunkBuffer};
use super::convert::sample_to_i16;

/// Commands sent from the controller to the capture worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerCommand {
    Stop,
}

/// Liveness flag returned from each audio callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// Keep delivering frames.
    Continue,
    /// The worker has shut down; further frames are ignored.
    Stop,
}

/// Channel endpoints wiring a worker to the controller and upload task.
pub struct WorkerChannels {
    pub commands: mpsc::Receiver<WorkerCommand>,
    pub chunks: mpsc::Sender<AudioChunk>,
}

/// Converts and buffers samples on the audio callback thread.
///
/// Created by the audio source once the device sample rate is known.
/// A `Stop` command is observed on the next callback after it is sent,
/// so shutdown latency is bounded by one frame period.
pub struct CaptureWorker {
    buffer: Option<ChunkBuffer>,
    commands: mpsc::Receiver<WorkerCommand>,
    chunks: mpsc::Sender<AudioChunk>,
}

impl CaptureWorker {
    pub fn new(sample_rate: u32, channels: WorkerChannels) -> Self {
        Self {
            buffer: Some(ChunkBuffer::for_sample_rate(sample_rate)),
            commands: channels.commands,
            chunks: channels.chunks,
        }
    }

    /// Process one frame of mono float samples.
    ///
    /// Malformed (empty) frames are skipped without side effects. Returns
    /// [`FrameStatus::Stop`] once a stop command has been received; the
    /// buffer is released at that point and later calls are no-ops.
    pub fn on_frame(&mut self, samples: &[f32]) -> FrameStatus {
        loop {
            match self.commands.try_recv() {
                Ok(WorkerCommand::Stop) => {
                    self.release();
                    return FrameStatus::Stop;
                }
                Err(TryRecvError::Empty) => break,
                // Controller went away; nobody wants these frames anymore
                Err(TryRecvError::Disconnected) => {
                    self.release();
                    return FrameStatus::Stop;
                }
            }
        }

        let Some(buffer) = self.buffer.as_mut() else {
            return FrameStatus::Stop;
        };

        if samples.is_empty() {
            return FrameStatus::Continue;
        }

        for &sample in samples {
            if let Some(chunk) = buffer.push(sample_to_i16(sample)) {
                match self.chunks.try_send(chunk) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        warn!("upload backlog is full, dropping audio chunk");
                    }
                    Err(TrySendError::Closed(_)) => {
                        // Upload side already gone; a stop command follows shortly
                        debug!("chunk channel closed, dropping audio chunk");
                    }
                }
            }
        }

        FrameStatus::Continue
    }

    /// Whether the worker is still accepting frames.
    pub fn is_active(&self) -> bool {
        self.buffer.is_some()
    }

    fn release(&mut self) {
        if self.buffer.take().is_some() {
            debug!("capture worker released its buffer");
        }
    }
}
