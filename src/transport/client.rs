use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::messages::{ChunkReply, ChunkStatus, IngestMode, SessionCreated};
use crate::audio::AudioChunk;
use crate::error::TransportError;

const SESSION_TIMEOUT: Duration = Duration::from_secs(10);
const INGEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A live recognition session.
///
/// Created by [`SessionTransport::open_session`]; no chunk may be
/// uploaded without one. The sequence counter starts at zero, increases
/// by one per uploaded chunk, and is never reused within a session.
#[derive(Debug)]
pub struct RecordingSession {
    session_id: String,
    next_sequence: u32,
}

impl RecordingSession {
    pub fn new(session_id: String) -> Self {
        Self {
            session_id,
            next_sequence: 0,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn next_sequence(&self) -> u32 {
        self.next_sequence
    }

    /// Consume the current sequence number for an upload attempt.
    fn take_sequence(&mut self) -> u32 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }
}

/// Event sent to the controller when the backend reports a finished
/// recognition.
#[derive(Debug, Clone)]
pub struct TranscriptReady {
    pub session_id: String,
    pub text: String,
}

/// HTTP client for the recognition backend.
pub struct SessionTransport {
    client: reqwest::Client,
    base_url: String,
}

impl SessionTransport {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(INGEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Open a new recognition session on the backend.
    pub async fn open_session(&self) -> Result<RecordingSession, TransportError> {
        let url = format!("{}/start", self.base_url);

        let response = self
            .client
            .post(&url)
            .timeout(SESSION_TIMEOUT)
            .send()
            .await
            .map_err(|e| TransportError::SessionCreate(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TransportError::SessionCreate(format!(
                "server returned {}",
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::SessionCreate(e.to_string()))?;
        let created: SessionCreated = serde_json::from_slice(&body)
            .map_err(|e| TransportError::SessionCreate(format!("invalid response body: {e}")))?;

        info!("Recognition session opened: {}", created.session_id);

        Ok(RecordingSession::new(created.session_id))
    }

    /// Upload one chunk under the session's next sequence number.
    ///
    /// The sequence number is consumed even if the upload fails, so a
    /// dropped chunk leaves a gap on the server rather than a reuse.
    pub async fn upload_chunk(
        &self,
        session: &mut RecordingSession,
        chunk: &AudioChunk,
    ) -> Result<ChunkStatus, TransportError> {
        let sequence = session.take_sequence();
        let bytes = chunk.to_le_bytes();

        debug!(
            session_id = session.session_id(),
            sequence,
            samples = chunk.len(),
            "Uploading audio chunk"
        );

        self.ingest(
            session.session_id(),
            bytes,
            format!("chunk-{sequence}.raw"),
            IngestMode::Chunk,
        )
        .await
        .map_err(|reason| TransportError::ChunkUpload {
            session_id: session.session_id().to_string(),
            sequence,
            reason,
        })
    }

    /// Upload a whole audio file for one-shot transcription (`mode=file`).
    pub async fn upload_file(
        &self,
        session: &mut RecordingSession,
        file_name: String,
        bytes: Vec<u8>,
    ) -> Result<ChunkStatus, TransportError> {
        let sequence = session.take_sequence();

        info!(
            session_id = session.session_id(),
            file = %file_name,
            bytes = bytes.len(),
            "Uploading audio file"
        );

        self.ingest(session.session_id(), bytes, file_name, IngestMode::File)
            .await
            .map_err(|reason| TransportError::ChunkUpload {
                session_id: session.session_id().to_string(),
                sequence,
                reason,
            })
    }

    async fn ingest(
        &self,
        session_id: &str,
        bytes: Vec<u8>,
        file_name: String,
        mode: IngestMode,
    ) -> std::result::Result<ChunkStatus, String> {
        let url = format!("{}/ingest-chunk", self.base_url);

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/octet-stream")
            .map_err(|e| e.to_string())?;

        let form = Form::new()
            .text("sessionId", session_id.to_string())
            .part("chunk", part)
            .text("mode", mode.as_str());

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("server returned {}", response.status()));
        }

        let body = response.bytes().await.map_err(|e| e.to_string())?;
        let reply: ChunkReply =
            serde_json::from_slice(&body).map_err(|e| format!("invalid response body: {e}"))?;

        Ok(reply.into_status())
    }
}

/// Drain chunks from the capture side and upload them one at a time.
///
/// Receiving and awaiting each upload before the next keeps uploads
/// serialized per session: in emission order, at most one in flight.
/// Upload failures drop the chunk and keep the session alive; a
/// `Finished` reply with text notifies the controller and ends the task.
pub async fn run_uploader(
    transport: Arc<SessionTransport>,
    mut session: RecordingSession,
    mut chunks: mpsc::Receiver<AudioChunk>,
    events: mpsc::Sender<TranscriptReady>,
    uploaded: Arc<AtomicUsize>,
) {
    debug!(session_id = session.session_id(), "Upload task started");

    while let Some(chunk) = chunks.recv().await {
        match transport.upload_chunk(&mut session, &chunk).await {
            Ok(ChunkStatus::Finished { text: Some(text) }) if !text.is_empty() => {
                uploaded.fetch_add(1, Ordering::SeqCst);
                info!(
                    session_id = session.session_id(),
                    "Recognition finished: {}", text
                );
                let _ = events
                    .send(TranscriptReady {
                        session_id: session.session_id().to_string(),
                        text,
                    })
                    .await;
                break;
            }
            Ok(ChunkStatus::Finished { text: _ }) => {
                // Finished only ends the session when a transcript is attached
                uploaded.fetch_add(1, Ordering::SeqCst);
                warn!(
                    session_id = session.session_id(),
                    "Finished status without text, ignoring"
                );
            }
            Ok(ChunkStatus::Silent) | Ok(ChunkStatus::Speech) => {
                uploaded.fetch_add(1, Ordering::SeqCst);
            }
            Ok(ChunkStatus::Error) => {
                uploaded.fetch_add(1, Ordering::SeqCst);
                warn!(
                    session_id = session.session_id(),
                    sequence = session.next_sequence() - 1,
                    "Backend reported an error for this chunk, continuing"
                );
            }
            Ok(ChunkStatus::Unknown(status)) => {
                uploaded.fetch_add(1, Ordering::SeqCst);
                warn!(
                    session_id = session.session_id(),
                    status = %status,
                    "Unrecognized chunk status from backend, ignoring"
                );
            }
            // Chunk is dropped; real-time audio cannot usefully be replayed
            Err(e) => warn!("{e}"),
        }
    }

    debug!(session_id = session.session_id(), "Upload task stopped");
}
