//! StreamClient: lifecycle state machine and receive loop over WebSocket.

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use robot_event::{Envelope, EventKind};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use crate::registry::{LifecycleHandler, SubscriptionId, SubscriptionRegistry};

/// Fixed stream path on the controller host.
const STREAM_PATH: &str = "/robot/ws";
const CONNECT_TIMEOUT_SECS: u64 = 10;
/// Max time `disconnect` waits for the receive loop before abandoning it.
const SHUTDOWN_TIMEOUT_SECS: u64 = 5;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsSource = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Lifecycle of one logical session.
///
/// `Faulted` and `Disconnecting` are transient: both settle in
/// `Disconnected` once teardown completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
    Faulted,
}

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("already connected")]
    AlreadyConnected,
    #[error("connect timeout after {0}s")]
    ConnectTimeout(u64),
    #[error("transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),
}

/// State shared between the client handle and the receive loop task.
struct Shared {
    state: Mutex<ConnectionState>,
    sink: tokio::sync::Mutex<Option<WsSink>>,
    registry: SubscriptionRegistry,
}

impl Shared {
    fn state(&self) -> ConnectionState {
        *self.state.lock().expect("state lock poisoned")
    }

    fn set_state(&self, next: ConnectionState) {
        *self.state.lock().expect("state lock poisoned") = next;
    }

    /// Claims the transition out of `Connected`. Exactly one of the explicit
    /// disconnect, a remote close, or a transport fault wins; the winner
    /// fires `on_disconnected`, everyone else backs off.
    fn begin_teardown(&self, via: ConnectionState) -> bool {
        let mut state = self.state.lock().expect("state lock poisoned");
        if *state == ConnectionState::Connected {
            *state = via;
            true
        } else {
            false
        }
    }

    /// Decodes and dispatches one text frame. Never propagates an error:
    /// an undecodable frame is dropped and the loop keeps receiving.
    fn handle_frame(&self, text: &str) {
        let envelope = match Envelope::decode(text) {
            Ok(env) => env,
            Err(e) => {
                tracing::warn!("dropping undecodable frame: {}", e);
                return;
            }
        };
        match envelope.kind() {
            EventKind::Unknown => {
                tracing::debug!(message_type = ?envelope.message_type, "unknown message type");
            }
            kind => self.registry.dispatch(kind, &envelope),
        }
    }

    /// Teardown initiated from inside the receive loop.
    async fn teardown_from_loop(&self, via: ConnectionState) {
        if !self.begin_teardown(via) {
            return;
        }
        if let Some(mut sink) = self.sink.lock().await.take() {
            if let Err(e) = sink.close().await {
                tracing::debug!("error closing transport: {}", e);
            }
        }
        self.registry.notify_disconnected();
        self.set_state(ConnectionState::Disconnected);
    }
}

/// Client for the controller's real-time event stream.
///
/// Owns at most one receive loop at a time. All methods may be called from
/// any task and interleave safely with ongoing dispatch.
pub struct StreamClient {
    url: String,
    shared: Arc<Shared>,
    cancel: Mutex<CancellationToken>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl StreamClient {
    /// Creates a disconnected client for `base_url` (e.g. `ws://host:8000`);
    /// the stream path is fixed.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base = base_url.into();
        Self {
            url: format!("{}{}", base.trim_end_matches('/'), STREAM_PATH),
            shared: Arc::new(Shared {
                state: Mutex::new(ConnectionState::Disconnected),
                sink: tokio::sync::Mutex::new(None),
                registry: SubscriptionRegistry::new(),
            }),
            cancel: Mutex::new(CancellationToken::new()),
            task: Mutex::new(None),
        }
    }

    /// Establishes the session and starts the receive loop.
    ///
    /// On failure the state stays `Disconnected` and the error is returned;
    /// no retry is attempted here (reconnect policy belongs to the caller).
    pub async fn connect(&self) -> Result<(), StreamError> {
        {
            let mut state = self.shared.state.lock().expect("state lock poisoned");
            if *state != ConnectionState::Disconnected {
                return Err(StreamError::AlreadyConnected);
            }
            *state = ConnectionState::Connecting;
        }

        let connected = tokio::time::timeout(
            Duration::from_secs(CONNECT_TIMEOUT_SECS),
            connect_async(&self.url),
        )
        .await;
        let ws = match connected {
            Ok(Ok((ws, _))) => ws,
            Ok(Err(e)) => {
                self.shared.set_state(ConnectionState::Disconnected);
                return Err(StreamError::Transport(e));
            }
            Err(_) => {
                self.shared.set_state(ConnectionState::Disconnected);
                return Err(StreamError::ConnectTimeout(CONNECT_TIMEOUT_SECS));
            }
        };

        let (sink, source) = ws.split();
        *self.shared.sink.lock().await = Some(sink);

        let cancel = CancellationToken::new();
        *self.cancel.lock().expect("cancel lock poisoned") = cancel.clone();

        self.shared.set_state(ConnectionState::Connected);
        self.shared.registry.notify_connected();
        tracing::info!("stream connected to {}", self.url);

        let shared = Arc::clone(&self.shared);
        let handle = tokio::spawn(receive_loop(shared, source, cancel));
        *self.task.lock().expect("task lock poisoned") = Some(handle);
        Ok(())
    }

    /// Gracefully closes the session. Idempotent: a no-op when already
    /// disconnected (including after a transport fault), and never fires
    /// `on_disconnected` twice for one session.
    pub async fn disconnect(&self) {
        if !self.shared.begin_teardown(ConnectionState::Disconnecting) {
            return;
        }

        // Best-effort close frame; failures must not block teardown.
        if let Some(mut sink) = self.shared.sink.lock().await.take() {
            if let Err(e) = sink.send(Message::Close(None)).await {
                tracing::warn!("error sending close frame: {}", e);
            }
        }

        let cancel = self
            .cancel
            .lock()
            .expect("cancel lock poisoned")
            .clone();
        cancel.cancel();

        let handle = self.task.lock().expect("task lock poisoned").take();
        if let Some(handle) = handle {
            let joined =
                tokio::time::timeout(Duration::from_secs(SHUTDOWN_TIMEOUT_SECS), handle).await;
            if joined.is_err() {
                tracing::warn!(
                    "receive loop did not exit within {}s, abandoning it",
                    SHUTDOWN_TIMEOUT_SECS
                );
            }
        }

        self.shared.registry.notify_disconnected();
        self.shared.set_state(ConnectionState::Disconnected);
        tracing::info!("stream disconnected");
    }

    pub fn is_connected(&self) -> bool {
        self.shared.state() == ConnectionState::Connected
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    /// Registers a subscriber for one event kind.
    ///
    /// Dispatch is synchronous on the receive loop: a slow or blocking
    /// handler stalls all further message processing for this connection.
    /// Registration is safe while connected; a frame in flight sees either
    /// the old or the new subscriber list, never a partial one.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&Envelope) + Send + Sync + 'static,
    {
        self.shared.registry.subscribe(kind, Arc::new(handler))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.registry.unsubscribe(id)
    }

    pub fn on_connected<F>(&self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.shared
            .registry
            .on_connected(Arc::new(handler) as LifecycleHandler);
    }

    pub fn on_disconnected<F>(&self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.shared
            .registry
            .on_disconnected(Arc::new(handler) as LifecycleHandler);
    }
}

impl Drop for StreamClient {
    fn drop(&mut self) {
        // Cannot await here; release the loop task unconditionally.
        if let Ok(mut task) = self.task.lock() {
            if let Some(handle) = task.take() {
                handle.abort();
            }
        }
    }
}

/// The single receive loop for one session. Exits on cancellation (silent:
/// the disconnect caller owns the lifecycle callback), on a remote close
/// (graceful teardown), or on a transport fault.
async fn receive_loop(shared: Arc<Shared>, mut source: WsSource, cancel: CancellationToken) {
    loop {
        let frame = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("receive loop cancelled");
                return;
            }
            frame = source.next() => frame,
        };
        match frame {
            Some(Ok(Message::Text(text))) => shared.handle_frame(&text),
            Some(Ok(Message::Close(_))) => {
                tracing::info!("server closed the stream");
                shared.teardown_from_loop(ConnectionState::Disconnecting).await;
                return;
            }
            Some(Ok(other)) => {
                tracing::debug!("ignoring non-text frame ({} bytes)", other.len());
            }
            Some(Err(e)) => {
                tracing::warn!("stream transport error: {}", e);
                shared.teardown_from_loop(ConnectionState::Faulted).await;
                return;
            }
            None => {
                tracing::warn!("stream ended without close frame");
                shared.teardown_from_loop(ConnectionState::Faulted).await;
                return;
            }
        }
    }
}
