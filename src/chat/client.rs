use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::ChatConfig;

/// A message as returned by `GET /api/messages`.
///
/// `created_at` is a naive timestamp because the message service emits
/// datetimes without an offset.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub room_id: String,
    pub text: String,
    pub client_type: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Serialize)]
struct NewMessage<'a> {
    room_id: &'a str,
    text: &'a str,
    client_type: &'a str,
}

/// Response body of `POST /api/messages`. Only the fields the client
/// acts on are kept; the service may synchronously attach a processed
/// reply.
#[derive(Debug, Deserialize)]
struct MessagePosted {
    #[serde(default)]
    reply_text: Option<String>,
}

/// Client for the chat message service.
///
/// This is the external collaborator the recording pipeline hands
/// finished transcripts to; it also backs the plain text-message path.
pub struct ChatClient {
    client: reqwest::Client,
    base_url: String,
    room_id: String,
    client_type: String,
}

impl ChatClient {
    pub fn new(config: &ChatConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            room_id: config.room_id.clone(),
            client_type: config.client_type.clone(),
        })
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Fetch the room's message history in server order.
    pub async fn fetch_messages(&self) -> Result<Vec<ChatMessage>> {
        let url = format!("{}/api/messages", self.base_url);

        let messages: Vec<ChatMessage> = self
            .client
            .get(&url)
            .query(&[("room_id", self.room_id.as_str())])
            .send()
            .await
            .context("Failed to fetch messages")?
            .error_for_status()
            .context("Message list request rejected")?
            .json()
            .await
            .context("Failed to parse message list")?;

        debug!(
            room_id = %self.room_id,
            count = messages.len(),
            "Fetched message history"
        );

        Ok(messages)
    }

    /// Post an outgoing message; returns the service's optional reply.
    pub async fn post_message(&self, text: &str) -> Result<Option<String>> {
        let url = format!("{}/api/messages", self.base_url);

        let posted: MessagePosted = self
            .client
            .post(&url)
            .json(&NewMessage {
                room_id: &self.room_id,
                text,
                client_type: &self.client_type,
            })
            .send()
            .await
            .context("Failed to post message")?
            .error_for_status()
            .context("Message post rejected")?
            .json()
            .await
            .context("Failed to parse message post response")?;

        info!(room_id = %self.room_id, "Posted chat message");

        Ok(posted.reply_text)
    }
}
