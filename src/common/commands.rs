use super::types::OutgoingEnvelope;

/// Commands the UI sends down to the network layer.
#[derive(Debug, Clone)]
pub enum NetworkCommand {
    Login { username: String, password: String },
    Register { username: String },
    Logout,
    /// Load the chat view with whatever cookie the jar already holds.
    OpenChat,
    SendMessage(OutgoingEnvelope),
}
