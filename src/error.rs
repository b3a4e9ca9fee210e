use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Errors raised by the network side of the client.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("malformed frame `{frame}`: {source}")]
    Decode {
        frame: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("frame matches no known envelope: {0}")]
    UnrecognizedFrame(String),

    #[error("unexpected server response: {0}")]
    UnexpectedResponse(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unsupported server scheme `{0}` (expected http or https)")]
    UnsupportedScheme(String),

    #[error("invalid handshake header: {0}")]
    InvalidHeader(#[from] tungstenite::http::header::InvalidHeaderValue),

    #[error("chat channel closed: {0}")]
    ChannelClosed(String),

    #[error("username must not be empty")]
    EmptyUsername,
}

pub type Result<T> = std::result::Result<T, ChatError>;
