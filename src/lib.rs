pub mod audio;
pub mod chat;
pub mod config;
pub mod controller;
pub mod error;
pub mod transport;

pub use audio::{
    chunk_capacity, list_input_devices, AudioChunk, AudioFile, AudioSource, CaptureWorker,
    ChunkBuffer, CpalMicrophone, FrameStatus, StreamInfo, WorkerChannels, WorkerCommand,
};
pub use chat::{ChatClient, ChatMessage};
pub use config::Config;
pub use controller::{RecordingController, RecordingState, RecordingStats, StopReason};
pub use error::{CaptureError, TransportError};
pub use transport::{
    run_uploader, ChunkStatus, IngestMode, RecordingSession, SessionTransport, TranscriptReady,
};
