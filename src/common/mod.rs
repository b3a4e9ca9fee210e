pub mod commands;
pub mod events;
pub mod types;

pub use commands::NetworkCommand;
pub use events::NetworkEvent;
pub use types::{DisplayRecord, Identity, IncomingEnvelope, LoginResult, OutgoingEnvelope};
