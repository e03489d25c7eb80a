//! WebSocket client for the coad metrics stream.
//!
//! Exposes four events: `Open`, `Data`, `Error` and `Close`. Observers are
//! registered per event kind with `on`/`off`, or all events can be taken
//! from a channel with `subscribe`. The client never reconnects on its own;
//! callers decide when to call `connect` again (see `ReconnectPolicy`).

use coa_shared::{parse_snapshot, MetricsSnapshot};
use futures::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

/// How long `close` waits for the server's closing handshake
const CLOSE_GRACE: Duration = Duration::from_secs(2);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed payload: {0}")]
    Payload(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Open,
    Data,
    Error,
    Close,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Open,
    Data(MetricsSnapshot),
    Error(StreamError),
    Close,
}

impl StreamEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Open => EventKind::Open,
            Self::Data(_) => EventKind::Data,
            Self::Error(_) => EventKind::Error,
            Self::Close => EventKind::Close,
        }
    }
}

/// Handle returned by `on`/`subscribe`, used to unregister
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Handler = Arc<dyn Fn(&StreamEvent) + Send + Sync>;

struct Observer {
    id: ObserverId,
    /// `None` receives every event
    filter: Option<EventKind>,
    handler: Handler,
}

#[derive(Default)]
struct Observers {
    next_id: u64,
    list: Vec<Observer>,
}

#[derive(Default)]
struct Shared {
    observers: Mutex<Observers>,
    connected: AtomicBool,
    /// Set by `connect`, cleared before `Close` is emitted
    active: AtomicBool,
}

impl Shared {
    fn observers(&self) -> MutexGuard<'_, Observers> {
        // A panicking handler runs outside the lock, so poisoning leaves the
        // list intact
        self.observers.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Deliver to matching observers. Handlers run outside the lock so they
    /// may call `on`/`off` themselves.
    fn emit(&self, event: StreamEvent) {
        let handlers: Vec<Handler> = self
            .observers()
            .list
            .iter()
            .filter(|o| o.filter.map_or(true, |k| k == event.kind()))
            .map(|o| Arc::clone(&o.handler))
            .collect();

        for handler in handlers {
            handler(&event);
        }
    }

    /// End of a connection attempt. `connect` is accepted again by the time
    /// observers see `Close`.
    fn finish(&self) {
        self.connected.store(false, Ordering::SeqCst);
        self.active.store(false, Ordering::SeqCst);
        self.emit(StreamEvent::Close);
    }
}

pub struct StreamClient {
    url: String,
    shared: Arc<Shared>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl StreamClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            shared: Arc::new(Shared::default()),
            shutdown: None,
            task: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Register a handler for one event kind
    pub fn on<F>(&self, kind: EventKind, handler: F) -> ObserverId
    where
        F: Fn(&StreamEvent) + Send + Sync + 'static,
    {
        self.register(Some(kind), Arc::new(handler))
    }

    /// Remove a handler; `false` if it was not registered
    pub fn off(&self, id: ObserverId) -> bool {
        let mut observers = self.shared.observers();
        let before = observers.list.len();
        observers.list.retain(|o| o.id != id);
        observers.list.len() != before
    }

    /// Receive every event on a channel, in emission order
    pub fn subscribe(&self) -> (ObserverId, mpsc::UnboundedReceiver<StreamEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.register(
            None,
            Arc::new(move |event: &StreamEvent| {
                // Receiver gone: the subscriber stopped listening
                let _ = tx.send(event.clone());
            }),
        );
        (id, rx)
    }

    fn register(&self, filter: Option<EventKind>, handler: Handler) -> ObserverId {
        let mut observers = self.shared.observers();
        observers.next_id += 1;
        let id = ObserverId(observers.next_id);
        observers.list.push(Observer {
            id,
            filter,
            handler,
        });
        id
    }

    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }

    /// Whether a connection is in progress (connecting, open or closing).
    /// False from the moment `Close` is emitted.
    pub fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::SeqCst)
    }

    /// Start connecting in the background. Outcomes arrive as events:
    /// `Open` on success, `Error` then `Close` on failure.
    ///
    /// No-op while a previous connection is still active.
    pub fn connect(&mut self) {
        if self.shared.active.swap(true, Ordering::SeqCst) {
            warn!("connect() ignored, {} is already active", self.url);
            return;
        }

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let url = self.url.clone();
        let shared = Arc::clone(&self.shared);
        self.shutdown = Some(shutdown_tx);
        self.task = Some(tokio::spawn(run_connection(url, shared, shutdown_rx)));
    }

    /// Ask the connection to close. `Close` is emitted once it has.
    pub fn close(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }

    /// Wait for the background connection to finish
    pub async fn wait_closed(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Stream task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for StreamClient {
    fn drop(&mut self) {
        self.close();
    }
}

enum Step {
    Shutdown,
    Inbound(Option<Result<Message, tokio_tungstenite::tungstenite::Error>>),
}

async fn run_connection(url: String, shared: Arc<Shared>, mut shutdown: oneshot::Receiver<()>) {
    let attempt = tokio::select! {
        _ = &mut shutdown => None,
        result = tokio_tungstenite::connect_async(url.as_str()) => Some(result),
    };

    let ws = match attempt {
        Some(Ok((ws, _))) => ws,
        Some(Err(e)) => {
            warn!("Failed to connect to {}: {}", url, e);
            shared.emit(StreamEvent::Error(StreamError::Transport(e.to_string())));
            shared.finish();
            return;
        }
        None => {
            debug!("Connect to {} cancelled", url);
            shared.finish();
            return;
        }
    };

    info!("Connected to {}", url);
    shared.connected.store(true, Ordering::SeqCst);
    shared.emit(StreamEvent::Open);

    let (mut write, mut read) = ws.split();

    loop {
        let step = tokio::select! {
            _ = &mut shutdown => Step::Shutdown,
            msg = read.next() => Step::Inbound(msg),
        };

        match step {
            Step::Shutdown => {
                debug!("Closing stream to {}", url);
                let _ = write.send(Message::Close(None)).await;
                // Drain until the server acknowledges or the grace period ends
                let _ = tokio::time::timeout(CLOSE_GRACE, async {
                    while let Some(Ok(msg)) = read.next().await {
                        if msg.is_close() {
                            break;
                        }
                    }
                })
                .await;
                break;
            }
            Step::Inbound(Some(Ok(Message::Text(text)))) => handle_payload(&shared, &text),
            Step::Inbound(Some(Ok(Message::Binary(bytes)))) => match String::from_utf8(bytes) {
                Ok(text) => handle_payload(&shared, &text),
                Err(e) => shared.emit(StreamEvent::Error(StreamError::Payload(e.to_string()))),
            },
            Step::Inbound(Some(Ok(Message::Close(_)))) | Step::Inbound(None) => {
                info!("Server closed stream {}", url);
                break;
            }
            Step::Inbound(Some(Ok(_))) => {}
            Step::Inbound(Some(Err(e))) => {
                warn!("Stream read error: {}", e);
                shared.emit(StreamEvent::Error(StreamError::Transport(e.to_string())));
                break;
            }
        }
    }

    shared.finish();
}

/// Malformed payloads become `Error` events; the connection stays open
fn handle_payload(shared: &Shared, text: &str) {
    match parse_snapshot(text) {
        Ok(snapshot) => shared.emit(StreamEvent::Data(snapshot)),
        Err(e) => {
            warn!("Dropping malformed snapshot: {}", e);
            shared.emit(StreamEvent::Error(StreamError::Payload(e.to_string())));
        }
    }
}

/// Wait between a `Close` and the next `connect`, so a dead server is not
/// hammered in a tight loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(5),
        }
    }
}

impl ReconnectPolicy {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub async fn wait(&self) {
        tokio::time::sleep(self.delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_on_and_off() {
        let client = StreamClient::new("ws://127.0.0.1:1/");
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let id = client.on(EventKind::Open, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        client.shared.emit(StreamEvent::Open);
        client.shared.emit(StreamEvent::Close);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        assert!(client.off(id));
        assert!(!client.off(id));
        client.shared.emit(StreamEvent::Open);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscribe_receives_all_kinds_in_order() {
        let client = StreamClient::new("ws://127.0.0.1:1/");
        let (_, mut rx) = client.subscribe();

        client.shared.emit(StreamEvent::Open);
        client.shared.emit(StreamEvent::Data(MetricsSnapshot::baseline()));
        client.shared.emit(StreamEvent::Close);

        assert_eq!(rx.try_recv().unwrap().kind(), EventKind::Open);
        assert_eq!(rx.try_recv().unwrap().kind(), EventKind::Data);
        assert_eq!(rx.try_recv().unwrap().kind(), EventKind::Close);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_malformed_payload_becomes_error_event() {
        let client = StreamClient::new("ws://127.0.0.1:1/");
        let (_, mut rx) = client.subscribe();

        handle_payload(&client.shared, "{\"passRate\":");
        match rx.try_recv().unwrap() {
            StreamEvent::Error(StreamError::Payload(_)) => {}
            other => panic!("expected payload error, got {:?}", other),
        }
    }

    #[test]
    fn test_handler_may_unregister_itself() {
        let client = Arc::new(StreamClient::new("ws://127.0.0.1:1/"));
        let slot: Arc<Mutex<Option<ObserverId>>> = Arc::new(Mutex::new(None));
        let (weak_client, weak_slot) = (Arc::downgrade(&client), Arc::clone(&slot));
        let id = client.on(EventKind::Data, move |_| {
            if let (Some(c), Some(id)) = (weak_client.upgrade(), *weak_slot.lock().unwrap()) {
                c.off(id);
            }
        });
        *slot.lock().unwrap() = Some(id);

        client.shared.emit(StreamEvent::Data(MetricsSnapshot::baseline()));
        assert!(!client.off(id));
    }

    #[tokio::test]
    async fn test_connect_failure_emits_error_then_close() {
        // Port 1 is reserved and refuses connections
        let mut client = StreamClient::new("ws://127.0.0.1:1/");
        let (_, mut rx) = client.subscribe();
        client.connect();

        let first = rx.recv().await.unwrap();
        assert!(matches!(first, StreamEvent::Error(StreamError::Transport(_))));
        assert_eq!(rx.recv().await.unwrap(), StreamEvent::Close);
        client.wait_closed().await;
        assert!(!client.is_connected());
        assert!(!client.is_active());
    }

    #[tokio::test]
    async fn test_close_during_handshake_emits_only_close() {
        // Accepts TCP but never answers the WebSocket handshake
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _held = tokio::spawn(async move {
            let mut sockets = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                sockets.push(socket);
            }
        });

        let mut client = StreamClient::new(format!("ws://{}/", addr));
        let (_, mut rx) = client.subscribe();
        client.connect();
        client.close();

        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event, StreamEvent::Close);
        client.wait_closed().await;
        assert!(rx.try_recv().is_err());
        assert!(!client.is_active());
    }

    #[test]
    fn test_default_reconnect_delay() {
        assert_eq!(ReconnectPolicy::default().delay, Duration::from_secs(5));
    }
}
