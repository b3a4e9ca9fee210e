pub mod auth;
pub mod channel;
pub mod client;
pub mod codec;

pub use auth::AuthGateway;
pub use client::ChatClient;
