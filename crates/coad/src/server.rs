//! HTTP/WebSocket server for coad
//!
//! `GET /` upgrades to a WebSocket carrying one JSON snapshot per tick.
//! `GET /health` reports uptime and the live subscriber count.

use crate::broadcast::{stream_to_subscriber, SnapshotSink};
use crate::sampler::MetricsSampler;
use crate::state::{HealthStatus, SharedState};
use anyhow::{Context, Result};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

impl SnapshotSink for SplitSink<WebSocket, Message> {
    type Error = axum::Error;

    fn push(&mut self, payload: String) -> impl Future<Output = Result<(), axum::Error>> + Send {
        self.send(Message::Text(payload))
    }
}

/// Build the router
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(ws_handler))
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Bind the listener
pub async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on ws://{}", listener.local_addr()?);
    Ok(listener)
}

/// Serve until `shutdown` resolves
pub async fn run<F>(listener: TcpListener, state: SharedState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server error")?;
    Ok(())
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthStatus> {
    Json(state.to_health())
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> Response {
    ws.on_upgrade(move |socket| handle_subscriber(socket, state))
}

/// Drive one subscriber until it goes away
async fn handle_subscriber(socket: WebSocket, state: SharedState) {
    let guard = state.register_subscriber();
    info!(
        "Subscriber {} connected ({} active)",
        guard.id,
        state.subscriber_count()
    );

    let (mut sender, mut receiver) = socket.split();
    let subscriber_id = guard.id;

    // Inbound traffic is ignored; we only watch for the end of the stream
    let closed = async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => break,
                Ok(_) => debug!("Subscriber {}: ignoring inbound frame", subscriber_id),
                Err(e) => {
                    warn!("Subscriber {}: receive error: {}", subscriber_id, e);
                    break;
                }
            }
        }
    };

    stream_to_subscriber(
        guard.id,
        &mut sender,
        closed,
        MetricsSampler::new(),
        state.interval,
    )
    .await;

    // Best effort, the peer may already be gone
    let _ = sender.close().await;
    drop(guard);
    info!("Subscriber disconnected ({} active)", state.subscriber_count());
}
