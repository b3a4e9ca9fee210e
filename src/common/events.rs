use super::types::{Identity, IncomingEnvelope};

/// Events the network layer reports to the UI.
///
/// Everything tied to one chat view load carries its `page` number so the UI
/// can drop stragglers from a view it already left.
#[derive(Debug, Clone)]
pub enum NetworkEvent {
    LoggedIn(Identity),
    LoginRejected(String),
    LoggedOut,
    PageOpened(u64),
    IdentityResolved {
        page: u64,
        identity: Option<Identity>,
    },
    ChannelOpened(u64),
    EnvelopeReceived {
        page: u64,
        envelope: IncomingEnvelope,
    },
    DecodeFailed {
        page: u64,
        reason: String,
    },
    ChannelClosed {
        page: u64,
        reason: String,
    },
    RequestFailed(String),
}
