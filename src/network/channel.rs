use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::COOKIE;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

use crate::common::{NetworkEvent, OutgoingEnvelope};
use crate::error::{ChatError, Result};

use super::auth::AuthGateway;
use super::codec::{decode_incoming, encode_outgoing};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// The persistent `/ws/chat` connection of one chat view.
///
/// There is no reconnect: once the socket drops, `run` returns and the view
/// stays disconnected until the next login or reload.
pub struct ChatChannel {
    socket: Socket,
    auth: AuthGateway,
    page: u64,
}

impl ChatChannel {
    /// Opens the socket, presenting whatever cookie the gateway's jar holds.
    pub async fn connect(ws_url: &Url, auth: AuthGateway, page: u64) -> Result<Self> {
        let mut request = ws_url.as_str().into_client_request()?;
        match auth.cookie_header() {
            Some(cookie) => {
                request
                    .headers_mut()
                    .insert(COOKIE, HeaderValue::from_str(&cookie)?);
            }
            None => log::warn!("Opening chat channel without an auth cookie"),
        }

        let (socket, _response) = connect_async(request).await?;
        log::info!("Chat channel {page} connected to {ws_url}");
        Ok(Self { socket, auth, page })
    }

    /// Pumps outgoing envelopes to the wire and inbound frames to `events`
    /// until either side goes away. Returns `Ok` only when the owner closed
    /// the outgoing queue.
    pub async fn run(
        self,
        mut outgoing: mpsc::Receiver<OutgoingEnvelope>,
        events: mpsc::Sender<NetworkEvent>,
    ) -> Result<()> {
        let Self { socket, auth, page } = self;
        let (mut writer, mut reader) = socket.split();

        loop {
            tokio::select! {
                envelope = outgoing.recv() => {
                    match envelope {
                        Some(envelope) => send(&mut writer, &auth, &envelope).await?,
                        None => {
                            log::info!("Chat channel {page} closed by client");
                            if let Err(err) = writer.close().await {
                                log::debug!("Close handshake failed: {err}");
                            }
                            return Ok(());
                        }
                    }
                }
                frame = reader.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            dispatch(page, text.as_str(), &events).await;
                        }
                        Some(Ok(Message::Close(close))) => {
                            let reason = close
                                .map(|frame| frame.reason.to_string())
                                .filter(|reason| !reason.is_empty())
                                .unwrap_or_else(|| "closed by server".to_string());
                            return Err(ChatError::ChannelClosed(reason));
                        }
                        Some(Ok(other)) => {
                            log::debug!("Ignoring non-text frame on channel {page}: {other:?}");
                        }
                        Some(Err(err)) => return Err(err.into()),
                        None => {
                            return Err(ChatError::ChannelClosed("connection lost".to_string()));
                        }
                    }
                }
            }
        }
    }
}

/// Writes one envelope, then clears the single-use auth cookie. Empty
/// messages are dropped without a frame.
async fn send(
    writer: &mut SplitSink<Socket, Message>,
    auth: &AuthGateway,
    envelope: &OutgoingEnvelope,
) -> Result<()> {
    if envelope.message.is_empty() {
        log::debug!("Dropping empty message for chat {}", envelope.chat_id);
        return Ok(());
    }

    let frame = encode_outgoing(envelope)?;
    writer.send(Message::text(frame)).await?;
    log::debug!("Sent message to chat {}", envelope.chat_id);
    auth.clear_auth_cookie();
    Ok(())
}

/// Skip-and-log: a frame that fails to decode is reported and the channel
/// keeps going.
async fn dispatch(page: u64, frame: &str, events: &mpsc::Sender<NetworkEvent>) {
    let event = match decode_incoming(frame) {
        Ok(envelope) => NetworkEvent::EnvelopeReceived { page, envelope },
        Err(err) => {
            log::warn!("Skipping undecodable frame on channel {page}: {err}");
            NetworkEvent::DecodeFailed {
                page,
                reason: err.to_string(),
            }
        }
    };
    if let Err(err) = events.send(event).await {
        log::warn!("Failed to notify UI about inbound frame: {err}");
    }
}
