//! JSON framing for the `/ws/chat` socket.

use serde::Deserialize;
use serde_json::Value;

use crate::common::{IncomingEnvelope, OutgoingEnvelope};
use crate::error::{ChatError, Result};

/// Every key an inbound frame may carry. The server attaches extra keys to
/// chat messages (a `db_status` with `status: true`, for instance), so
/// nothing here is required up front.
#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(default)]
    sender: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    /// Kept loose: only `success: false` means anything, whatever else the
    /// server puts here is ignored.
    #[serde(default)]
    db_status: Option<Value>,
}

pub fn encode_outgoing(envelope: &OutgoingEnvelope) -> Result<String> {
    Ok(serde_json::to_string(envelope)?)
}

/// Decodes one text frame. Only an explicit `db_status.success == false`
/// marks a delivery error; anything else must look like a chat message.
pub fn decode_incoming(frame: &str) -> Result<IncomingEnvelope> {
    let raw: RawFrame = serde_json::from_str(frame).map_err(|source| ChatError::Decode {
        frame: frame.to_string(),
        source,
    })?;

    if let Some(status) = &raw.db_status {
        if status.get("success") == Some(&Value::Bool(false)) {
            let message = status
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return Ok(IncomingEnvelope::DeliveryError { message });
        }
    }

    match (raw.sender, raw.message, raw.created_at) {
        (Some(sender), Some(message), Some(created_at)) => Ok(IncomingEnvelope::ChatMessage {
            sender,
            message,
            created_at,
        }),
        _ => Err(ChatError::UnrecognizedFrame(frame.to_string())),
    }
}
