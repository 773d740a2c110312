use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};
use url::Url;

use super::{SessionConfig, SessionEvent, SessionState};
use crate::error::WsError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Writer = SplitSink<WsStream, Message>;
type Reader = SplitStream<WsStream>;

const SERVER_CLOSED: &str = "close received from the server";
const CONNECTION_LOST: &str = "connection lost without a close handshake";

/// State shared between a session and its read loop.
struct Shared {
    state: Mutex<SessionState>,
    writer: tokio::sync::Mutex<Option<Writer>>,
    events: broadcast::Sender<SessionEvent>,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state(&self) -> SessionState { *self.lock_state() }

    fn set_state(&self, next: SessionState) {
        let mut state = self.lock_state();
        debug!(from = %*state, to = %next, "session state");
        *state = next;
    }

    /// Move to `next` only if currently in `from`.
    fn transition(&self, from: SessionState, next: SessionState) -> bool {
        let mut state = self.lock_state();
        if *state != from {
            return false;
        }
        debug!(from = %from, to = %next, "session state");
        *state = next;
        true
    }

    fn publish(&self, event: SessionEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }

    fn publish_abort(&self, error: String) {
        self.publish(SessionEvent::Error(error));
        self.publish(SessionEvent::Disconnected { description: None });
    }
}

/// A WebSocket client connection with an event channel.
///
/// All methods take `&self`; a session can be shared across tasks behind an
/// `Arc`. Outgoing messages are serialized by an async lock on the writer
/// half, incoming ones are handled by a background task spawned on connect.
///
/// # Examples
///
/// ```no_run
/// use pulith_net::{SessionEvent, WebSocketSession};
///
/// # async fn run() -> Result<(), pulith_net::WsError> {
/// let session = WebSocketSession::new();
/// let mut events = session.subscribe();
///
/// session.connect("wss://example.com/feed").await?;
/// session.send("hello").await?;
///
/// while let Ok(event) = events.recv().await {
///     if let SessionEvent::MessageReceived(text) = event {
///         println!("{text}");
///         break;
///     }
/// }
///
/// session.close("bye").await?;
/// # Ok(())
/// # }
/// ```
pub struct WebSocketSession {
    shared: Arc<Shared>,
    config: SessionConfig,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl Default for WebSocketSession {
    fn default() -> Self { Self::new() }
}

impl WebSocketSession {
    pub fn new() -> Self { Self::with_config(SessionConfig::default()) }

    pub fn with_config(config: SessionConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        let shared = Shared {
            state: Mutex::new(SessionState::None),
            writer: tokio::sync::Mutex::new(None),
            events,
        };
        Self { shared: Arc::new(shared), config, reader: Mutex::new(None) }
    }

    pub fn state(&self) -> SessionState { self.shared.state() }

    pub fn config(&self) -> &SessionConfig { &self.config }

    /// Receive every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> { self.shared.events.subscribe() }

    /// Open a connection to `url`.
    ///
    /// Returns the current state unchanged if a connection is already open or
    /// being opened. On failure the session ends up [`SessionState::Aborted`],
    /// `Error` and `Disconnected` events are published and the fault is
    /// returned.
    pub async fn connect(&self, url: &str) -> Result<SessionState, WsError> {
        {
            let mut state = self.shared.lock_state();
            if matches!(*state, SessionState::Open | SessionState::Connecting) {
                return Ok(*state);
            }
            debug!(from = %*state, to = %SessionState::Connecting, "session state");
            *state = SessionState::Connecting;
        }

        // Leftovers of a previous connection.
        self.stop_reader();

        let url = match Url::parse(url) {
            Ok(url) => url,
            Err(e) => {
                let message = format!("{url}: {e}");
                self.abort_connect(message.clone());
                return Err(WsError::InvalidUrl(message));
            }
        };

        let stream = match connect_async(url.as_str()).await {
            Ok((stream, _)) => stream,
            Err(e) => {
                warn!(url = %url, error = %e, "websocket connect failed");
                self.abort_connect(e.to_string());
                return Err(WsError::Connect(Box::new(e)));
            }
        };

        let (writer, reader) = stream.split();
        {
            let mut writer_slot = self.shared.writer.lock().await;
            let mut reader_slot = self.lock_reader();

            // Disposed while the handshake ran: the connection is dropped here.
            if !self.shared.transition(SessionState::Connecting, SessionState::Open) {
                debug!(url = %url, state = %self.state(), "session released during handshake");
                return Ok(self.state());
            }

            *writer_slot = Some(writer);
            self.shared.publish(SessionEvent::Connected);
            *reader_slot = Some(tokio::spawn(read_loop(Arc::clone(&self.shared), reader)));
        }
        info!(url = %url, "websocket connected");

        Ok(SessionState::Open)
    }

    /// Send `text` as a single text message.
    ///
    /// Does nothing if `text` is empty or the session is not open.
    pub async fn send(&self, text: &str) -> Result<(), WsError> {
        if text.is_empty() || !self.state().is_open() {
            return Ok(());
        }

        let sent = {
            let mut writer = self.shared.writer.lock().await;
            match writer.as_mut() {
                Some(sink) => sink.send(Message::text(text.to_owned())).await,
                None => return Ok(()),
            }
        };

        match sent {
            Ok(()) => {
                self.shared.publish(SessionEvent::MessageSent(text.to_owned()));
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "websocket send failed");
                self.shared.publish(SessionEvent::Error(e.to_string()));
                Err(WsError::Send(Box::new(e)))
            }
        }
    }

    /// Close the connection with a normal-closure frame carrying `description`.
    ///
    /// Waits up to [`SessionConfig::close_timeout`] for the peer to complete the
    /// handshake, then releases the connection. Does nothing unless open.
    pub async fn close(&self, description: &str) -> Result<(), WsError> {
        if !self.shared.transition(SessionState::Open, SessionState::CloseSent) {
            return Ok(());
        }

        let frame = CloseFrame { code: CloseCode::Normal, reason: description.to_owned().into() };
        let sent = {
            let mut writer = self.shared.writer.lock().await;
            match writer.as_mut() {
                Some(sink) => sink.send(Message::Close(Some(frame))).await,
                None => Ok(()),
            }
        };

        let reader = self.lock_reader().take();
        if let Some(handle) = reader {
            if sent.is_err() {
                handle.abort();
            } else {
                let abort = handle.abort_handle();
                if tokio::time::timeout(self.config.close_timeout, handle).await.is_err() {
                    debug!("peer did not complete the close handshake in time");
                    abort.abort();
                }
            }
        }

        self.shared.set_state(SessionState::Closed);
        let description = Some(description.to_owned()).filter(|d| !d.is_empty());
        self.shared.publish(SessionEvent::Disconnected { description });
        self.dispose();

        sent.map_err(|e| WsError::Close(Box::new(e)))
    }

    /// Release the connection without a close handshake.
    ///
    /// Safe to call any number of times. An active session becomes
    /// [`SessionState::Closed`]; no event is published.
    pub fn dispose(&self) {
        self.stop_reader();

        match self.shared.writer.try_lock() {
            Ok(mut writer) => drop(writer.take()),
            // A send is in flight; release the writer once it completes.
            Err(_) => {
                if let Ok(runtime) = Handle::try_current() {
                    let shared = Arc::clone(&self.shared);
                    runtime.spawn(async move { drop(shared.writer.lock().await.take()) });
                }
            }
        }

        let mut state = self.shared.lock_state();
        if state.is_active() {
            *state = SessionState::Closed;
        }
    }

    /// Fail a pending connect, unless it was disposed meanwhile.
    fn abort_connect(&self, error: String) {
        if self.shared.transition(SessionState::Connecting, SessionState::Aborted) {
            self.shared.publish_abort(error);
        }
    }

    fn lock_reader(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.reader.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stop_reader(&self) {
        if let Some(handle) = self.lock_reader().take() {
            handle.abort();
        }
    }
}

impl Drop for WebSocketSession {
    fn drop(&mut self) {
        let reader = self.reader.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = reader.take() {
            handle.abort();
        }
    }
}

async fn read_loop(shared: Arc<Shared>, mut reader: Reader) {
    while let Some(message) = reader.next().await {
        match message {
            Ok(Message::Text(text)) => {
                if !text.is_empty() {
                    shared.publish(SessionEvent::MessageReceived(text.as_str().to_owned()));
                }
            }
            Ok(Message::Binary(data)) => {
                debug!(len = data.len(), "ignoring binary message");
            }
            Ok(Message::Close(frame)) => {
                on_peer_close(&shared, frame).await;
                return;
            }
            // Ping and pong are answered by the transport.
            Ok(_) => {}
            Err(e) => {
                if shared.transition(SessionState::Open, SessionState::Aborted) {
                    warn!(error = %e, "websocket connection failed");
                    shared.publish_abort(e.to_string());
                }
                return;
            }
        }
    }

    if shared.transition(SessionState::Open, SessionState::Aborted) {
        warn!("websocket stream ended unexpectedly");
        shared.publish_abort(CONNECTION_LOST.to_owned());
    }
}

async fn on_peer_close(shared: &Shared, frame: Option<CloseFrame>) {
    // After a local close this is the peer's echo; `close` finishes the job.
    if !shared.transition(SessionState::Open, SessionState::CloseReceived) {
        return;
    }

    // The reply frame is queued by the protocol layer; closing the sink flushes it.
    if let Some(mut writer) = shared.writer.lock().await.take() {
        if let Err(e) = writer.close().await {
            debug!(error = %e, "close reply not delivered");
        }
    }

    shared.set_state(SessionState::Closed);

    let description = frame
        .map(|f| f.reason.as_str().to_owned())
        .filter(|reason| !reason.is_empty())
        .unwrap_or_else(|| SERVER_CLOSED.to_owned());
    info!(reason = %description, "websocket closed by peer");
    shared.publish(SessionEvent::Disconnected { description: Some(description) });
}
