//! Shared types for the CoA pipeline components.
//!
//! Wire format (metrics snapshots), assistant message model, analysis
//! payloads and notifications. Used by both `coad` and `coactl`.

pub mod analysis;
pub mod error;
pub mod message;
pub mod metrics;
pub mod notification;

pub use error::CoaError;
pub use metrics::{parse_snapshot, MetricsSnapshot};

/// Crate version, shared by the daemon and the client
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default port the daemon listens on
pub const DEFAULT_PORT: u16 = 3001;

/// Default broadcast interval per subscriber, in milliseconds
pub const DEFAULT_INTERVAL_MS: u64 = 5_000;
