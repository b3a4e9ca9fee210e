use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ChatError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "config/client.json";
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";
pub const DEFAULT_CHAT_ID: &str = "1";

const CHAT_SOCKET_PATH: &str = "/ws/chat";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base HTTP address of the chat server.
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Room every outgoing envelope is addressed to.
    #[serde(default = "default_chat_id")]
    pub chat_id: String,
    /// Explicit `sender_id` for outgoing envelopes. Falls back to the
    /// resolved identity when unset.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Pre-existing `X-Authorization` value; skips the login view when set.
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Full chat socket URL, for servers that expose `/ws/chat` elsewhere.
    #[serde(default)]
    pub socket_url: Option<String>,
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_chat_id() -> String {
    DEFAULT_CHAT_ID.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            chat_id: default_chat_id(),
            user_id: None,
            auth_token: None,
            socket_url: None,
        }
    }
}

impl AppConfig {
    pub fn base_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.server_url)?)
    }

    /// Absolute URL of an HTTP API path such as `/api/login`.
    pub fn api_url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url()?.join(path)?)
    }

    /// WebSocket endpoint: `socket_url` when set, otherwise derived from the
    /// server URL (`http` -> `ws`, `https` -> `wss`).
    pub fn ws_url(&self) -> Result<Url> {
        if let Some(socket_url) = self.socket_url.as_deref() {
            return Ok(Url::parse(socket_url)?);
        }
        let mut url = self.base_url()?;
        let scheme = match url.scheme() {
            "http" => "ws",
            "https" => "wss",
            other => return Err(ChatError::UnsupportedScheme(other.to_string())),
        };
        url.set_scheme(scheme)
            .map_err(|()| ChatError::UnsupportedScheme(scheme.to_string()))?;
        Ok(url.join(CHAT_SOCKET_PATH)?)
    }
}

pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                AppConfig::default()
            }
        },
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); using defaults",
                path.display()
            );
            AppConfig::default()
        }
    }
}
