//! Per-subscriber broadcast loop.
//!
//! Every connection gets its own sampler and its own ticker. There is no
//! shared tick: two subscribers connected at the same moment receive
//! independently drawn snapshots.

use crate::sampler::MetricsSampler;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Outbound half of a subscriber connection
pub trait SnapshotSink {
    type Error: Display;

    /// Push one serialized snapshot
    fn push(&mut self, payload: String) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Counters for one finished subscriber session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub sent: u64,
    pub failed: u64,
}

/// Stream snapshots to one subscriber until `closed` resolves.
///
/// Sends one snapshot immediately, then one per tick. Failed sends are
/// logged and counted; they never end the session. Dropping out of the loop
/// drops the ticker, so a closed connection sees no further pushes.
pub async fn stream_to_subscriber<S, C>(
    subscriber_id: u64,
    sink: &mut S,
    closed: C,
    mut sampler: MetricsSampler,
    every: Duration,
) -> SessionStats
where
    S: SnapshotSink,
    C: Future<Output = ()>,
{
    let mut stats = SessionStats::default();
    tokio::pin!(closed);

    push_snapshot(subscriber_id, sink, &mut sampler, &mut stats).await;

    let mut ticker = time::interval_at(Instant::now() + every, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = &mut closed => break,
            _ = ticker.tick() => {
                push_snapshot(subscriber_id, sink, &mut sampler, &mut stats).await;
            }
        }
    }

    info!(
        "Subscriber {} closed after {} snapshots ({} failed)",
        subscriber_id, stats.sent, stats.failed
    );
    stats
}

async fn push_snapshot<S: SnapshotSink>(
    subscriber_id: u64,
    sink: &mut S,
    sampler: &mut MetricsSampler,
    stats: &mut SessionStats,
) {
    let payload = match sampler.sample().to_json() {
        Ok(json) => json,
        Err(e) => {
            warn!("Subscriber {}: failed to serialize snapshot: {}", subscriber_id, e);
            stats.failed += 1;
            return;
        }
    };

    match sink.push(payload).await {
        Ok(()) => {
            stats.sent += 1;
            debug!("Subscriber {}: snapshot {} sent", subscriber_id, stats.sent);
        }
        Err(e) => {
            stats.failed += 1;
            warn!("Subscriber {}: send failed: {}", subscriber_id, e);
        }
    }
}
