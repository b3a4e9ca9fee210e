use crate::common::{DisplayRecord, IncomingEnvelope};
use crate::session::SessionContext;

/// Label shown instead of the sender name on the user's own messages.
pub const OWN_SENDER_LABEL: &str = "You";

/// Append-only transcript of one chat view, in arrival order.
#[derive(Debug, Default)]
pub struct MessageSink {
    records: Vec<DisplayRecord>,
    scroll_pending: bool,
}

impl MessageSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Projects `envelope` into a record and appends it. Every append also
    /// schedules a scroll to the newest record.
    pub fn accept(&mut self, envelope: IncomingEnvelope, session: &SessionContext) {
        let record = match envelope {
            IncomingEnvelope::DeliveryError { message } => DisplayRecord::Error { message },
            IncomingEnvelope::ChatMessage {
                sender,
                message,
                created_at,
            } => {
                let sender = if session.is_own(&sender) {
                    OWN_SENDER_LABEL.to_string()
                } else {
                    sender
                };
                DisplayRecord::Message {
                    sender,
                    message,
                    created_at,
                }
            }
        };
        self.records.push(record);
        self.scroll_pending = true;
    }

    pub fn records(&self) -> &[DisplayRecord] {
        &self.records
    }

    /// Returns whether a scroll is owed and resets the flag.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_pending)
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.scroll_pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Identity;

    fn chat(sender: &str, message: &str, created_at: &str) -> IncomingEnvelope {
        IncomingEnvelope::ChatMessage {
            sender: sender.to_string(),
            message: message.to_string(),
            created_at: created_at.to_string(),
        }
    }

    fn session_for(id: &str) -> SessionContext {
        let mut session = SessionContext::new();
        session.set(Identity::from_username(id));
        session
    }

    #[test]
    fn own_message_is_labelled_you() {
        let session = session_for("u1");
        let mut sink = MessageSink::new();
        sink.accept(chat("u1", "hi", "t1"), &session);

        assert_eq!(
            sink.records(),
            &[DisplayRecord::Message {
                sender: "You".to_string(),
                message: "hi".to_string(),
                created_at: "t1".to_string(),
            }]
        );
    }

    #[test]
    fn other_senders_are_kept_verbatim() {
        let session = session_for("u1");
        let mut sink = MessageSink::new();
        sink.accept(chat("u10", "hey", "t1"), &session);
        sink.accept(chat("U1", "hey", "t2"), &session);

        let senders: Vec<_> = sink
            .records()
            .iter()
            .map(|record| match record {
                DisplayRecord::Message { sender, .. } => sender.as_str(),
                DisplayRecord::Error { .. } => "<error>",
            })
            .collect();
        assert_eq!(senders, ["u10", "U1"]);
    }

    #[test]
    fn nothing_is_own_before_identity_resolves() {
        let session = SessionContext::new();
        let mut sink = MessageSink::new();
        sink.accept(chat("u1", "early", "t0"), &session);

        assert!(matches!(
            &sink.records()[0],
            DisplayRecord::Message { sender, .. } if sender == "u1"
        ));
    }

    #[test]
    fn delivery_error_becomes_error_record() {
        let session = session_for("u1");
        let mut sink = MessageSink::new();
        sink.accept(
            IncomingEnvelope::DeliveryError {
                message: "db down".to_string(),
            },
            &session,
        );

        assert_eq!(
            sink.records(),
            &[DisplayRecord::Error {
                message: "db down".to_string()
            }]
        );
    }

    #[test]
    fn records_follow_arrival_order_not_timestamps() {
        let session = session_for("u1");
        let mut sink = MessageSink::new();
        sink.accept(chat("bob", "second", "t2"), &session);
        sink.accept(chat("bob", "first", "t1"), &session);

        let bodies: Vec<_> = sink
            .records()
            .iter()
            .filter_map(|record| match record {
                DisplayRecord::Message { message, .. } => Some(message.as_str()),
                DisplayRecord::Error { .. } => None,
            })
            .collect();
        assert_eq!(bodies, ["second", "first"]);
    }

    #[test]
    fn duplicate_frames_yield_duplicate_records() {
        let session = session_for("u1");
        let mut sink = MessageSink::new();
        sink.accept(chat("bob", "again", "t1"), &session);
        sink.accept(chat("bob", "again", "t1"), &session);

        assert_eq!(sink.records().len(), 2);
        assert_eq!(sink.records()[0], sink.records()[1]);
    }

    #[test]
    fn every_append_requests_a_scroll() {
        let session = SessionContext::new();
        let mut sink = MessageSink::new();
        assert!(!sink.take_scroll_request());

        sink.accept(chat("bob", "one", "t1"), &session);
        assert!(sink.take_scroll_request());
        assert!(!sink.take_scroll_request());

        sink.accept(
            IncomingEnvelope::DeliveryError {
                message: "oops".to_string(),
            },
            &session,
        );
        assert!(sink.take_scroll_request());
    }
}
