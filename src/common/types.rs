use serde::{Deserialize, Serialize};

/// The locally authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub name: String,
}

impl Identity {
    /// The server keys its cookie on the username, so id and name coincide
    /// unless the server reports them separately.
    pub fn from_username(username: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            id: username.clone(),
            name: username,
        }
    }

    pub fn matches(&self, sender: &str) -> bool {
        self.id == sender || self.name == sender
    }
}

/// Outcome of a login exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginResult {
    Success(Identity),
    Rejected(String),
}

/// Client -> server frame. Field order is the wire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingEnvelope {
    pub sender_id: String,
    pub chat_id: String,
    pub message: String,
}

/// Server -> client frame, after decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncomingEnvelope {
    ChatMessage {
        sender: String,
        message: String,
        created_at: String,
    },
    /// The server failed to process some earlier send. Which one is unknown:
    /// outgoing envelopes carry no client message id.
    DeliveryError { message: String },
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayRecord {
    Message {
        sender: String,
        message: String,
        created_at: String,
    },
    Error {
        message: String,
    },
}
