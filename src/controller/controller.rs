//! Recording controller
//!
//! The state machine that drives a recording's lifecycle:
//! `Idle -> Starting -> Active -> Stopping -> Idle`. The controller is
//! the only component that knows whether recording is live, and the
//! exclusive owner of the microphone source, the capture worker's command
//! channel, and the upload task.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::state::{RecordingState, RecordingStats, StopReason};
use crate::audio::{AudioSource, WorkerChannels, WorkerCommand};
use crate::chat::ChatClient;
use crate::transport::{run_uploader, SessionTransport, TranscriptReady};

/// Commands queued ahead of the worker; Stop is the only one today
const COMMAND_QUEUE: usize = 4;
/// Roughly sixteen seconds of chunk backlog before the worker drops
const CHUNK_QUEUE: usize = 32;

/// Resources held while a recording is live, released together on stop.
struct ActiveRecording {
    session_id: String,
    commands: mpsc::Sender<WorkerCommand>,
    upload_task: JoinHandle<()>,
    uploaded: Arc<AtomicUsize>,
    started_at: DateTime<Utc>,
}

pub struct RecordingController {
    source: Box<dyn AudioSource>,
    transport: Arc<SessionTransport>,
    chat: Arc<ChatClient>,
    events: mpsc::Sender<TranscriptReady>,
    state: RecordingState,
    active: Option<ActiveRecording>,
}

impl RecordingController {
    pub fn new(
        source: Box<dyn AudioSource>,
        transport: Arc<SessionTransport>,
        chat: Arc<ChatClient>,
        events: mpsc::Sender<TranscriptReady>,
    ) -> Self {
        Self {
            source,
            transport,
            chat,
            events,
            state: RecordingState::Idle,
            active: None,
        }
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecordingState::Active
    }

    /// Session id of the live recording, if any.
    pub fn session_id(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.session_id.as_str())
    }

    /// Start when idle, stop when active.
    pub async fn toggle(&mut self) -> Result<()> {
        match self.state {
            RecordingState::Idle => self.start().await,
            RecordingState::Active => {
                self.stop(StopReason::UserToggle).await;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Begin a recording: acquire the microphone, open a backend session,
    /// and spawn the upload task.
    ///
    /// A no-op unless idle. Any failure rolls back everything acquired so
    /// far and returns to `Idle`; in particular a session-open failure
    /// releases the already-running microphone stream and nothing is ever
    /// uploaded.
    pub async fn start(&mut self) -> Result<()> {
        if self.state != RecordingState::Idle {
            debug!(
                state = self.state.as_str(),
                "Start ignored, recording already in progress"
            );
            return Ok(());
        }
        self.state = RecordingState::Starting;

        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE);
        let (chunk_tx, chunk_rx) = mpsc::channel(CHUNK_QUEUE);

        let stream = match self
            .source
            .start(WorkerChannels {
                commands: command_rx,
                chunks: chunk_tx,
            })
            .await
        {
            Ok(stream) => stream,
            Err(e) => {
                self.state = RecordingState::Idle;
                return Err(e).context("Failed to acquire microphone");
            }
        };

        info!(
            device = %stream.device,
            sample_rate = stream.sample_rate,
            channels = stream.channels,
            "Microphone stream acquired"
        );

        let session = match self.transport.open_session().await {
            Ok(session) => session,
            Err(e) => {
                // Release the stream we already acquired
                let _ = command_tx.try_send(WorkerCommand::Stop);
                if let Err(stop_err) = self.source.stop().await {
                    warn!("Rollback of audio source failed: {stop_err}");
                }
                self.state = RecordingState::Idle;
                return Err(e).context("Failed to open recognition session");
            }
        };

        let session_id = session.session_id().to_string();
        let uploaded = Arc::new(AtomicUsize::new(0));
        let upload_task = tokio::spawn(run_uploader(
            Arc::clone(&self.transport),
            session,
            chunk_rx,
            self.events.clone(),
            Arc::clone(&uploaded),
        ));

        self.active = Some(ActiveRecording {
            session_id: session_id.clone(),
            commands: command_tx,
            upload_task,
            uploaded,
            started_at: Utc::now(),
        });
        self.state = RecordingState::Active;

        info!(session_id = %session_id, "Recording started");
        Ok(())
    }

    /// Stop the recording and release every held resource.
    ///
    /// All stop triggers are equivalent and the operation is idempotent:
    /// once back in `Idle` further stop calls do nothing, so overlapping
    /// triggers cannot double-release.
    pub async fn stop(&mut self, reason: StopReason) -> Option<RecordingStats> {
        if self.state == RecordingState::Idle {
            debug!("Stop ignored, nothing is recording");
            return None;
        }
        self.state = RecordingState::Stopping;
        info!(reason = reason.as_str(), "Stopping recording");

        let stats = match self.active.take() {
            Some(active) => {
                // The worker observes Stop on its next frame, before the
                // stream itself is detached
                let _ = active.commands.try_send(WorkerCommand::Stop);

                if let Err(e) = self.source.stop().await {
                    warn!("Failed to stop audio source: {e}");
                }

                // An upload still in flight is abandoned; its response no
                // longer has a session to land in
                active.upload_task.abort();

                let duration = Utc::now().signed_duration_since(active.started_at);
                let stats = RecordingStats {
                    session_id: active.session_id,
                    started_at: active.started_at,
                    duration_secs: duration.num_milliseconds() as f64 / 1000.0,
                    chunks_uploaded: active.uploaded.load(Ordering::SeqCst),
                };

                info!(
                    session_id = %stats.session_id,
                    chunks = stats.chunks_uploaded,
                    duration_secs = stats.duration_secs,
                    "Recording stopped"
                );
                Some(stats)
            }
            None => None,
        };

        self.state = RecordingState::Idle;
        stats
    }

    /// React to a finished recognition: forward the transcript to the
    /// chat collaborator, then tear the session down.
    ///
    /// Events for a session that is no longer live are ignored, which
    /// covers responses that arrive after a stop.
    ///
    /// Returns the chat service's optional reply.
    pub async fn handle_transcript(&mut self, event: TranscriptReady) -> Option<String> {
        let live = self.state == RecordingState::Active
            && self.session_id() == Some(event.session_id.as_str());
        if !live {
            debug!(
                session_id = %event.session_id,
                "Ignoring transcript for a session that is no longer live"
            );
            return None;
        }

        let reply = match self.chat.post_message(&event.text).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Failed to forward transcript to chat: {e:#}");
                None
            }
        };

        self.stop(StopReason::Finished).await;
        reply
    }
}
