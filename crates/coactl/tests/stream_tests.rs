//! Stream client against real WebSocket servers on ephemeral ports.

use axum::extract::ws::{Message as WsMessage, WebSocketUpgrade};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use coa_shared::MetricsSnapshot;
use coactl::commands::first_snapshot;
use coactl::stream::{EventKind, StreamClient, StreamError, StreamEvent};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

async fn start_coad(interval: Duration) -> (SocketAddr, oneshot::Sender<()>) {
    let listener = coad::server::bind("127.0.0.1:0".parse().unwrap())
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    let state = coad::state::create_shared_state(interval);
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    tokio::spawn(coad::server::run(listener, state, async move {
        let _ = stop_rx.await;
    }));
    (addr, stop_tx)
}

/// Sends a garbage frame, one valid snapshot, then closes
async fn scripted(ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(|mut socket| async move {
        let _ = socket.send(WsMessage::Text("not json".to_string())).await;
        let json = MetricsSnapshot::baseline().to_json().unwrap();
        let _ = socket.send(WsMessage::Text(json)).await;
        let _ = socket.send(WsMessage::Close(None)).await;
    })
}

async fn start_scripted() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/", get(scripted));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<StreamEvent>) -> StreamEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

#[tokio::test]
async fn test_open_data_then_close_on_request() {
    let (addr, _stop) = start_coad(Duration::from_millis(200)).await;
    let mut client = StreamClient::new(format!("ws://{}/", addr));
    let (_, mut events) = client.subscribe();
    client.connect();

    assert_eq!(next_event(&mut events).await, StreamEvent::Open);
    assert!(client.is_connected());

    for _ in 0..2 {
        match next_event(&mut events).await {
            StreamEvent::Data(snapshot) => assert!(snapshot.validate().is_ok()),
            other => panic!("expected data, got {:?}", other),
        }
    }

    client.close();
    loop {
        // Snapshots already in flight may still arrive before Close
        match next_event(&mut events).await {
            StreamEvent::Close => break,
            StreamEvent::Data(_) => {}
            other => panic!("unexpected {:?}", other),
        }
    }
    client.wait_closed().await;
    assert!(!client.is_connected());
}

#[tokio::test]
async fn test_malformed_frame_keeps_connection_open() {
    let addr = start_scripted().await;
    let mut client = StreamClient::new(format!("ws://{}/", addr));
    let (_, mut events) = client.subscribe();
    client.connect();

    assert_eq!(next_event(&mut events).await, StreamEvent::Open);
    assert!(matches!(
        next_event(&mut events).await,
        StreamEvent::Error(StreamError::Payload(_))
    ));
    match next_event(&mut events).await {
        StreamEvent::Data(snapshot) => {
            assert_eq!(snapshot.pass_rate, coa_shared::metrics::BASE_PASS_RATE)
        }
        other => panic!("expected data, got {:?}", other),
    }
    assert_eq!(next_event(&mut events).await, StreamEvent::Close);
}

#[tokio::test]
async fn test_on_handler_sees_only_its_kind() {
    let (addr, _stop) = start_coad(Duration::from_millis(200)).await;
    let mut client = StreamClient::new(format!("ws://{}/", addr));
    let seen: Arc<Mutex<Vec<EventKind>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    client.on(EventKind::Data, move |event| {
        sink.lock().unwrap().push(event.kind());
    });
    let (_, mut events) = client.subscribe();
    client.connect();

    // Open plus two snapshots on the channel
    for _ in 0..3 {
        next_event(&mut events).await;
    }
    client.close();
    client.wait_closed().await;

    let seen = seen.lock().unwrap();
    assert!(seen.len() >= 2);
    assert!(seen.iter().all(|k| *k == EventKind::Data));
}

#[tokio::test]
async fn test_reconnect_after_close() {
    let addr = start_scripted().await;
    let mut client = StreamClient::new(format!("ws://{}/", addr));
    let (_, mut events) = client.subscribe();

    for _ in 0..2 {
        client.connect();
        loop {
            if next_event(&mut events).await == StreamEvent::Close {
                break;
            }
        }
        client.wait_closed().await;
        assert!(!client.is_active());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_connect_accepted_as_soon_as_close_is_seen() {
    let addr = start_scripted().await;
    let mut client = StreamClient::new(format!("ws://{}/", addr));
    let (_, mut events) = client.subscribe();

    // Every connect must run to its own Close, with no wait in between
    for _ in 0..200 {
        client.connect();
        loop {
            if next_event(&mut events).await == StreamEvent::Close {
                break;
            }
        }
        assert!(!client.is_active());
    }
}

#[tokio::test]
async fn test_first_snapshot_from_live_daemon() {
    let (addr, _stop) = start_coad(Duration::from_secs(10)).await;
    let snapshot = first_snapshot(&format!("ws://{}/", addr), Duration::from_secs(5))
        .await
        .unwrap();
    assert!((90.0..=100.0).contains(&snapshot.pass_rate));
}
