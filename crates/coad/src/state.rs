//! Daemon state shared across connections.

use coa_shared::VERSION;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Health report served on /health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub subscribers: usize,
    pub interval_ms: u64,
}

pub struct AppState {
    pub interval: Duration,
    pub started_at: Instant,
    subscribers: AtomicUsize,
    next_subscriber_id: AtomicU64,
}

impl AppState {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            started_at: Instant::now(),
            subscribers: AtomicUsize::new(0),
            next_subscriber_id: AtomicU64::new(1),
        }
    }

    /// Register a new subscriber, returning its id. The returned guard
    /// decrements the gauge when the session ends, however it ends.
    pub fn register_subscriber(self: &Arc<Self>) -> SubscriberGuard {
        let id = self.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.fetch_add(1, Ordering::Relaxed);
        SubscriberGuard {
            id,
            state: Arc::clone(self),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.load(Ordering::Relaxed)
    }

    pub fn to_health(&self) -> HealthStatus {
        HealthStatus {
            status: "ok".to_string(),
            version: VERSION.to_string(),
            uptime_seconds: self.started_at.elapsed().as_secs(),
            subscribers: self.subscriber_count(),
            interval_ms: self.interval.as_millis() as u64,
        }
    }
}

pub struct SubscriberGuard {
    pub id: u64,
    state: Arc<AppState>,
}

impl Drop for SubscriberGuard {
    fn drop(&mut self) {
        self.state.subscribers.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Thread-safe shared state handle
pub type SharedState = Arc<AppState>;

pub fn create_shared_state(interval: Duration) -> SharedState {
    Arc::new(AppState::new(interval))
}
