use serde::Deserialize;

/// Response body of `POST /start`
#[derive(Debug, Deserialize)]
pub struct SessionCreated {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

/// Response body of `POST /ingest-chunk`
#[derive(Debug, Deserialize)]
pub struct ChunkReply {
    pub status: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// Interpretation of a chunk upload reply.
///
/// The backend's status strings form a closed set on the client; anything
/// it does not recognize lands in `Unknown`, which is logged and treated
/// as a no-op rather than terminating the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkStatus {
    /// No speech detected in this chunk
    Silent,
    /// Speech detected, recognition still in progress
    Speech,
    /// Recognition complete; `text` carries the transcript
    Finished { text: Option<String> },
    /// Backend-side error for this chunk; non-fatal
    Error,
    /// Unrecognized status string from the backend
    Unknown(String),
}

impl ChunkReply {
    pub fn into_status(self) -> ChunkStatus {
        match self.status.as_str() {
            "Silent" => ChunkStatus::Silent,
            "Speech" => ChunkStatus::Speech,
            "Finished" => ChunkStatus::Finished { text: self.text },
            "Error" => ChunkStatus::Error,
            other => ChunkStatus::Unknown(other.to_string()),
        }
    }
}

/// Value of the `mode` form field on the ingest endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestMode {
    /// Streaming: one half-second PCM chunk of a live session
    Chunk,
    /// Whole-file transcription (WAV upload)
    File,
}

impl IngestMode {
    pub fn as_str(self) -> &'static str {
        match self {
            IngestMode::Chunk => "chunk",
            IngestMode::File => "file",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_statuses_map_to_variants() {
        let reply = |status: &str, text: Option<&str>| ChunkReply {
            status: status.to_string(),
            text: text.map(String::from),
        };

        assert_eq!(reply("Silent", None).into_status(), ChunkStatus::Silent);
        assert_eq!(reply("Speech", None).into_status(), ChunkStatus::Speech);
        assert_eq!(reply("Error", None).into_status(), ChunkStatus::Error);
        assert_eq!(
            reply("Finished", Some("hello")).into_status(),
            ChunkStatus::Finished {
                text: Some("hello".to_string())
            }
        );
    }

    #[test]
    fn test_unrecognized_status_falls_back_to_unknown() {
        let reply = ChunkReply {
            status: "Recalibrating".to_string(),
            text: None,
        };
        assert_eq!(
            reply.into_status(),
            ChunkStatus::Unknown("Recalibrating".to_string())
        );
    }

    #[test]
    fn test_reply_deserializes_without_text() {
        let reply: ChunkReply = serde_json::from_str(r#"{"status":"Silent"}"#).unwrap();
        assert_eq!(reply.status, "Silent");
        assert!(reply.text.is_none());
    }
}
