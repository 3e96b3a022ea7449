pub mod client;
pub mod messages;

pub use client::{run_uploader, RecordingSession, SessionTransport, TranscriptReady};
pub use messages::{ChunkReply, ChunkStatus, IngestMode, SessionCreated};
