use tokio::sync::mpsc;

use crate::common::{Identity, LoginResult, NetworkCommand, NetworkEvent, OutgoingEnvelope};
use crate::config::AppConfig;
use crate::error::Result;

use super::auth::AuthGateway;
use super::channel::ChatChannel;

const OUTGOING_BUFFER: usize = 32;

/// Network side of the app: turns UI commands into HTTP calls and chat
/// channel traffic, and reports back through `NetworkEvent`s.
pub struct ChatClient {
    event_sender: mpsc::Sender<NetworkEvent>,
    command_receiver: mpsc::Receiver<NetworkCommand>,
    config: AppConfig,
    auth: AuthGateway,
    /// Writer handle of the live chat channel. Dropping it closes the socket.
    outgoing: Option<mpsc::Sender<OutgoingEnvelope>>,
    page: u64,
}

impl ChatClient {
    pub fn new(
        event_sender: mpsc::Sender<NetworkEvent>,
        command_receiver: mpsc::Receiver<NetworkCommand>,
        config: AppConfig,
        auth: AuthGateway,
    ) -> Self {
        Self {
            event_sender,
            command_receiver,
            config,
            auth,
            outgoing: None,
            page: 0,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        log::info!("Network event loop started against {}", self.config.server_url);

        while let Some(command) = self.command_receiver.recv().await {
            self.handle_command(command).await;
        }

        log::info!("UI went away; network event loop stopped");
        Ok(())
    }

    async fn handle_command(&mut self, command: NetworkCommand) {
        match command {
            NetworkCommand::Login { username, password } => {
                match self.auth.login(&username, &password).await {
                    Ok(LoginResult::Success(identity)) => self.enter_chat(identity).await,
                    Ok(LoginResult::Rejected(reason)) => {
                        self.emit(NetworkEvent::LoginRejected(reason)).await;
                    }
                    Err(err) => {
                        log::error!("Login request failed: {err}");
                        self.emit(NetworkEvent::RequestFailed(err.to_string())).await;
                    }
                }
            }
            NetworkCommand::Register { username } => match self.auth.register(&username).await {
                Ok(identity) => self.enter_chat(identity).await,
                Err(err) => {
                    log::error!("Register request failed: {err}");
                    self.emit(NetworkEvent::RequestFailed(err.to_string())).await;
                }
            },
            NetworkCommand::Logout => {
                self.outgoing = None;
                if let Err(err) = self.auth.logout().await {
                    log::warn!("Logout request failed: {err}");
                }
                self.emit(NetworkEvent::LoggedOut).await;
            }
            NetworkCommand::OpenChat => self.open_page().await,
            NetworkCommand::SendMessage(envelope) => self.forward(envelope).await,
        }
    }

    async fn enter_chat(&mut self, identity: Identity) {
        log::info!("Authenticated as {}", identity.name);
        self.emit(NetworkEvent::LoggedIn(identity)).await;
        self.open_page().await;
    }

    /// Loads the chat view: the current-user fetch and the channel open run
    /// as two independent tasks with no ordering between them.
    async fn open_page(&mut self) {
        self.page += 1;
        let page = self.page;
        // Replacing the handle ends the previous view's channel.
        let (outgoing_tx, outgoing_rx) = mpsc::channel(OUTGOING_BUFFER);
        self.outgoing = Some(outgoing_tx);
        self.emit(NetworkEvent::PageOpened(page)).await;

        let auth = self.auth.clone();
        let events = self.event_sender.clone();
        tokio::spawn(async move {
            let identity = match auth.current_user().await {
                Ok(identity) => identity,
                Err(err) => {
                    log::warn!("Current user lookup failed for page {page}: {err}");
                    None
                }
            };
            let _ = events
                .send(NetworkEvent::IdentityResolved { page, identity })
                .await;
        });

        let ws_url = match self.config.ws_url() {
            Ok(url) => url,
            Err(err) => {
                log::error!("Cannot derive chat endpoint: {err}");
                self.emit(NetworkEvent::ChannelClosed {
                    page,
                    reason: err.to_string(),
                })
                .await;
                return;
            }
        };
        let auth = self.auth.clone();
        let events = self.event_sender.clone();
        tokio::spawn(async move {
            let channel = match ChatChannel::connect(&ws_url, auth, page).await {
                Ok(channel) => channel,
                Err(err) => {
                    log::error!("Chat channel {page} failed to connect: {err}");
                    let _ = events
                        .send(NetworkEvent::ChannelClosed {
                            page,
                            reason: err.to_string(),
                        })
                        .await;
                    return;
                }
            };
            let _ = events.send(NetworkEvent::ChannelOpened(page)).await;

            let reason = match channel.run(outgoing_rx, events.clone()).await {
                Ok(()) => "closed by client".to_string(),
                Err(err) => {
                    log::warn!("Chat channel {page} terminated: {err}");
                    err.to_string()
                }
            };
            let _ = events.send(NetworkEvent::ChannelClosed { page, reason }).await;
        });
    }

    async fn forward(&mut self, envelope: OutgoingEnvelope) {
        let Some(outgoing) = &self.outgoing else {
            log::warn!("No chat channel open; message dropped");
            return;
        };
        if outgoing.send(envelope).await.is_err() {
            log::warn!("Chat channel {} is closed; message dropped", self.page);
            self.outgoing = None;
        }
    }

    async fn emit(&self, event: NetworkEvent) {
        if let Err(err) = self.event_sender.send(event).await {
            log::warn!("Failed to notify UI: {err}");
        }
    }
}
