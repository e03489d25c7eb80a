//! In-memory notification registry.
//!
//! One registry per running instance, constructed explicitly and handed to
//! whatever needs it. Clones share the same log. Delivery is simulated:
//! each recipient gets a log line, nothing leaves the process.

use crate::assistant::insight::derive_insights;
use crate::assistant::ProcessingThresholds;
use coa_shared::analysis::Severity;
use coa_shared::metrics::RiskLevel;
use coa_shared::notification::{Notification, NotificationKind, Recipient};
use coa_shared::MetricsSnapshot;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct NotificationRegistry {
    log: Arc<RwLock<Vec<Notification>>>,
}

impl NotificationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a notification and simulate delivery to every recipient
    pub async fn send_notification(
        &self,
        message: &str,
        kind: NotificationKind,
        recipients: &[Recipient],
    ) -> Notification {
        let notification = Notification::new(message, kind);

        for recipient in recipients {
            info!(
                "Sending {} notification to {} ({:?}): {}",
                kind, recipient.email, recipient.role, message
            );
        }

        self.log.write().await.push(notification.clone());
        notification
    }

    /// Full log in insertion order
    pub async fn notifications(&self) -> Vec<Notification> {
        self.log.read().await.clone()
    }

    /// Mark one notification read. Unknown ids are a no-op (`false`).
    pub async fn mark_as_read(&self, id: &str) -> bool {
        let mut log = self.log.write().await;
        match log.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.read = true;
                true
            }
            None => false,
        }
    }

    pub async fn unread_count(&self) -> usize {
        self.log.read().await.iter().filter(|n| !n.read).count()
    }
}

/// Turns streamed snapshots into notifications.
///
/// A notification is raised when a snapshot enters an alert state (high
/// deadline risk, critical insight); staying in it raises nothing more.
pub struct AlertWatcher {
    registry: NotificationRegistry,
    recipients: Vec<Recipient>,
    thresholds: ProcessingThresholds,
    high_risk: bool,
    critical: bool,
}

impl AlertWatcher {
    pub fn new(
        registry: NotificationRegistry,
        recipients: Vec<Recipient>,
        thresholds: ProcessingThresholds,
    ) -> Self {
        Self {
            registry,
            recipients,
            thresholds,
            high_risk: false,
            critical: false,
        }
    }

    pub fn registry(&self) -> &NotificationRegistry {
        &self.registry
    }

    /// Returns the notifications raised by this snapshot
    pub async fn observe(&mut self, snapshot: &MetricsSnapshot) -> Vec<Notification> {
        let mut raised = Vec::new();

        let high_risk = snapshot.deadline_data.risk_level == RiskLevel::High;
        if high_risk && !self.high_risk {
            let message = format!(
                "Deadline risk is high: {:.1} h remaining, processing takes {:.1} h",
                snapshot.deadline_data.time_remaining, snapshot.processing_time
            );
            raised.push(
                self.registry
                    .send_notification(&message, NotificationKind::Warning, &self.recipients)
                    .await,
            );
        }
        self.high_risk = high_risk;

        let critical: Vec<_> = derive_insights(snapshot, &self.thresholds)
            .into_iter()
            .filter(|i| i.severity == Severity::Critical)
            .collect();
        if !critical.is_empty() && !self.critical {
            for insight in &critical {
                raised.push(
                    self.registry
                        .send_notification(&insight.message, NotificationKind::Error, &self.recipients)
                        .await,
                );
            }
        }
        self.critical = !critical.is_empty();

        raised
    }
}
