use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub chat: ChatConfig,
    pub audio: AudioConfig,
}

/// Recognition backend endpoints (`/start`, `/ingest-chunk`)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
}

/// Chat message service (`/api/messages`)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub base_url: String,
    pub room_id: String,
    pub client_type: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AudioConfig {
    /// Input device name substring; the default input device when unset
    pub device: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            room_id: "default".to_string(),
            client_type: "cli".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file, falling back to localhost defaults
    /// when the file is absent.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
