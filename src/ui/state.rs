use chrono::{DateTime, Local};
use tokio::sync::mpsc;

use crate::common::{NetworkCommand, NetworkEvent, OutgoingEnvelope};
use crate::config::AppConfig;
use crate::session::SessionContext;

use super::sink::MessageSink;

const MAX_NOTICES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Chat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Idle,
    Connecting,
    Open,
    Closed(String),
}

/// Status line entry (decode failures, disconnects and the like). These stay
/// out of the transcript.
#[derive(Debug, Clone)]
pub struct Notice {
    pub timestamp: DateTime<Local>,
    pub text: String,
}

/// Local UI state.
pub struct AppState {
    pub view: View,
    pub session: SessionContext,
    pub sink: MessageSink,
    pub input_text: String,
    pub username_input: String,
    pub password_input: String,
    pub login_error: Option<String>,
    pub connection: ConnectionStatus,
    pub notices: Vec<Notice>,
    /// Chat view load the state currently belongs to.
    pub page: Option<u64>,
    chat_id: String,
    user_id: Option<String>,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            view: View::Login,
            session: SessionContext::new(),
            sink: MessageSink::new(),
            input_text: String::new(),
            username_input: String::new(),
            password_input: String::new(),
            login_error: None,
            connection: ConnectionStatus::Idle,
            notices: Vec::new(),
            page: None,
            chat_id: config.chat_id.clone(),
            user_id: config.user_id.clone(),
        }
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    pub fn apply(&mut self, event: NetworkEvent) {
        match event {
            NetworkEvent::LoggedIn(identity) => {
                self.login_error = None;
                self.password_input.clear();
                self.view = View::Chat;
                self.push_notice(format!("Logged in as {}", identity.name));
            }
            NetworkEvent::LoginRejected(reason) => {
                self.login_error = Some(reason);
            }
            NetworkEvent::LoggedOut => {
                self.view = View::Login;
                self.page = None;
                self.session.reset();
                self.sink.clear();
                self.input_text.clear();
                self.connection = ConnectionStatus::Idle;
                self.push_notice("Logged out".to_string());
            }
            NetworkEvent::PageOpened(page) => {
                self.view = View::Chat;
                self.page = Some(page);
                self.session.reset();
                self.sink.clear();
                self.connection = ConnectionStatus::Connecting;
            }
            NetworkEvent::IdentityResolved { page, identity } => {
                if !self.is_current(page) {
                    return;
                }
                match identity {
                    Some(identity) => {
                        self.session.set(identity);
                    }
                    None => self.push_notice("Server reported no current user".to_string()),
                }
            }
            NetworkEvent::ChannelOpened(page) => {
                if self.is_current(page) {
                    self.connection = ConnectionStatus::Open;
                }
            }
            NetworkEvent::EnvelopeReceived { page, envelope } => {
                if self.is_current(page) {
                    self.sink.accept(envelope, &self.session);
                }
            }
            NetworkEvent::DecodeFailed { page, reason } => {
                if self.is_current(page) {
                    self.push_notice(format!("Skipped malformed frame: {reason}"));
                }
            }
            NetworkEvent::ChannelClosed { page, reason } => {
                if self.is_current(page) {
                    self.push_notice(format!("Disconnected: {reason}"));
                    self.connection = ConnectionStatus::Closed(reason);
                }
            }
            NetworkEvent::RequestFailed(reason) => match self.view {
                View::Login => self.login_error = Some(reason),
                View::Chat => self.push_notice(reason),
            },
        }
    }

    /// Queues the compose text for sending. The field is cleared only once
    /// the network task has accepted the command; a full or closed queue
    /// keeps the text and leaves a notice.
    pub fn submit(&mut self, commands: &mpsc::Sender<NetworkCommand>) -> bool {
        let Some(envelope) = self.build_submission() else {
            return false;
        };
        match commands.try_send(NetworkCommand::SendMessage(envelope)) {
            Ok(()) => {
                self.input_text.clear();
                true
            }
            Err(err) => {
                log::warn!("Failed to queue message: {err}");
                self.push_notice(format!("Message not sent: {err}"));
                false
            }
        }
    }

    /// Envelope for the current compose text. Empty input or an unknown
    /// sender yields nothing.
    fn build_submission(&self) -> Option<OutgoingEnvelope> {
        if self.input_text.is_empty() {
            return None;
        }

        let sender_id = self
            .user_id
            .clone()
            .or_else(|| self.session.get().map(|identity| identity.id.clone()));
        let Some(sender_id) = sender_id else {
            log::warn!("Identity not resolved yet; message kept in the compose field");
            return None;
        };

        Some(OutgoingEnvelope {
            sender_id,
            chat_id: self.chat_id.clone(),
            message: self.input_text.clone(),
        })
    }

    pub fn login_command(&mut self) -> Option<NetworkCommand> {
        let username = self.username_input.trim().to_string();
        if username.is_empty() {
            return None;
        }
        self.login_error = None;
        Some(NetworkCommand::Login {
            username,
            password: self.password_input.clone(),
        })
    }

    pub fn register_command(&mut self) -> Option<NetworkCommand> {
        let username = self.username_input.trim().to_string();
        if username.is_empty() {
            return None;
        }
        self.login_error = None;
        Some(NetworkCommand::Register { username })
    }

    pub fn push_notice(&mut self, text: String) {
        self.notices.push(Notice {
            timestamp: Local::now(),
            text,
        });

        if self.notices.len() > MAX_NOTICES {
            self.notices.remove(0);
        }
    }

    fn is_current(&self, page: u64) -> bool {
        let current = self.page == Some(page);
        if !current {
            log::debug!("Dropping event from stale chat view {page}");
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{DisplayRecord, Identity, IncomingEnvelope};

    fn state() -> AppState {
        AppState::new(&AppConfig {
            chat_id: "c1".to_string(),
            ..AppConfig::default()
        })
    }

    fn chat(sender: &str, message: &str) -> IncomingEnvelope {
        IncomingEnvelope::ChatMessage {
            sender: sender.to_string(),
            message: message.to_string(),
            created_at: "t1".to_string(),
        }
    }

    fn identified_state() -> AppState {
        let mut state = state();
        state.apply(NetworkEvent::PageOpened(1));
        state.apply(NetworkEvent::IdentityResolved {
            page: 1,
            identity: Some(Identity::from_username("u1")),
        });
        state
    }

    #[test]
    fn submit_queues_envelope_and_clears_compose() {
        let mut state = identified_state();
        state.input_text = "hello".to_string();
        let (tx, mut rx) = mpsc::channel(4);

        assert!(state.submit(&tx));
        match rx.try_recv().unwrap() {
            NetworkCommand::SendMessage(envelope) => assert_eq!(
                envelope,
                OutgoingEnvelope {
                    sender_id: "u1".to_string(),
                    chat_id: "c1".to_string(),
                    message: "hello".to_string(),
                }
            ),
            other => panic!("unexpected command {other:?}"),
        }
        assert!(state.input_text.is_empty());
        assert!(!state.submit(&tx));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn full_queue_keeps_compose_text() {
        let mut state = identified_state();
        let (tx, _rx) = mpsc::channel(1);
        tx.try_send(NetworkCommand::OpenChat).unwrap();
        state.input_text = "hello".to_string();

        assert!(!state.submit(&tx));
        assert_eq!(state.input_text, "hello");
        assert_eq!(state.notices.len(), 1);
        assert!(state.notices[0].text.starts_with("Message not sent"));
    }

    #[test]
    fn empty_submit_changes_nothing() {
        let mut state = state();
        state.apply(NetworkEvent::PageOpened(1));
        assert!(state.build_submission().is_none());
        assert!(state.sink.records().is_empty());
    }

    #[test]
    fn configured_user_id_wins_over_identity() {
        let mut state = AppState::new(&AppConfig {
            user_id: Some("42".to_string()),
            ..AppConfig::default()
        });
        state.input_text = "hi".to_string();
        assert_eq!(state.build_submission().unwrap().sender_id, "42");
    }

    #[test]
    fn submit_without_any_sender_keeps_text() {
        let mut state = state();
        state.input_text = "pending".to_string();
        assert!(state.build_submission().is_none());
        assert_eq!(state.input_text, "pending");
    }

    #[test]
    fn identity_race_resolves_safely() {
        let mut state = state();
        state.apply(NetworkEvent::PageOpened(1));
        state.apply(NetworkEvent::EnvelopeReceived {
            page: 1,
            envelope: chat("u1", "before"),
        });
        state.apply(NetworkEvent::IdentityResolved {
            page: 1,
            identity: Some(Identity::from_username("u1")),
        });
        state.apply(NetworkEvent::EnvelopeReceived {
            page: 1,
            envelope: chat("u1", "after"),
        });

        let senders: Vec<_> = state
            .sink
            .records()
            .iter()
            .filter_map(|record| match record {
                DisplayRecord::Message { sender, .. } => Some(sender.as_str()),
                DisplayRecord::Error { .. } => None,
            })
            .collect();
        assert_eq!(senders, ["u1", "You"]);
    }

    #[test]
    fn stale_page_events_are_ignored() {
        let mut state = state();
        state.apply(NetworkEvent::PageOpened(1));
        state.apply(NetworkEvent::PageOpened(2));
        state.apply(NetworkEvent::EnvelopeReceived {
            page: 1,
            envelope: chat("bob", "old"),
        });
        state.apply(NetworkEvent::ChannelClosed {
            page: 1,
            reason: "closed by client".to_string(),
        });

        assert!(state.sink.records().is_empty());
        assert_eq!(state.connection, ConnectionStatus::Connecting);
    }

    #[test]
    fn decode_failure_goes_to_notices_not_transcript() {
        let mut state = state();
        state.apply(NetworkEvent::PageOpened(1));
        state.apply(NetworkEvent::DecodeFailed {
            page: 1,
            reason: "bad".to_string(),
        });

        assert!(state.sink.records().is_empty());
        assert!(state.notices.last().unwrap().text.contains("bad"));
    }

    #[test]
    fn login_rejection_is_shown_inline() {
        let mut state = state();
        state.apply(NetworkEvent::LoginRejected("Incorrect Password".to_string()));
        assert_eq!(state.view, View::Login);
        assert_eq!(state.login_error.as_deref(), Some("Incorrect Password"));
    }

    #[test]
    fn login_requires_username() {
        let mut state = state();
        state.password_input = "pw".to_string();
        assert!(state.login_command().is_none());

        state.username_input = " alice ".to_string();
        state.password_input.clear();
        assert!(matches!(
            state.login_command(),
            Some(NetworkCommand::Login { username, password })
                if username == "alice" && password.is_empty()
        ));
    }

    #[test]
    fn logout_resets_the_view() {
        let mut state = state();
        state.apply(NetworkEvent::PageOpened(1));
        state.apply(NetworkEvent::IdentityResolved {
            page: 1,
            identity: Some(Identity::from_username("u1")),
        });
        state.apply(NetworkEvent::EnvelopeReceived {
            page: 1,
            envelope: chat("bob", "hi"),
        });
        state.apply(NetworkEvent::LoggedOut);

        assert_eq!(state.view, View::Login);
        assert!(state.session.get().is_none());
        assert!(state.sink.records().is_empty());
        assert_eq!(state.page, None);
    }
}
