//! Terminal rendering for snapshots, assistant messages and notifications.

use coa_shared::analysis::{Insight, MetricReading, Severity};
use coa_shared::message::{AssistantMessage, MessageBody, Sender};
use coa_shared::metrics::{LoadStatus, RiskLevel};
use coa_shared::notification::{Notification, NotificationKind};
use coa_shared::MetricsSnapshot;
use owo_colors::OwoColorize;

const THIN_SEP: &str = "------------------------------------------------------------";

/// Short id prefix shown to the user; `expand`/`read` accept it back
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn risk(level: RiskLevel) -> String {
    match level {
        RiskLevel::Low => level.green().to_string(),
        RiskLevel::Medium => level.yellow().to_string(),
        RiskLevel::High => level.red().bold().to_string(),
    }
}

fn load_status(status: LoadStatus) -> String {
    match status {
        LoadStatus::Completed => status.green().to_string(),
        LoadStatus::Processing => status.cyan().to_string(),
        LoadStatus::Pending => status.dimmed().to_string(),
        LoadStatus::Delayed => status.red().to_string(),
    }
}

/// One-line summary used by `watch`
pub fn snapshot_line(snapshot: &MetricsSnapshot) -> String {
    let deadline = &snapshot.deadline_data;
    let load = &snapshot.load_status_data;
    let bottleneck = load
        .bottleneck
        .map(|b| format!(" @ {}", b))
        .unwrap_or_default();

    format!(
        "{}  pass {:>5.1}%  dev {:>4.2}  proc {:>4.1} h  deadline {:>5.1} h ({})  {}{}  util {:.0}%",
        snapshot.timestamp.format("%H:%M:%S").dimmed(),
        snapshot.pass_rate,
        snapshot.avg_deviation,
        snapshot.processing_time,
        deadline.time_remaining,
        risk(deadline.risk_level),
        load_status(load.status),
        bottleneck,
        load.resource_utilization,
    )
}

/// Multi-line block used by `sample`
pub fn snapshot_block(snapshot: &MetricsSnapshot) -> String {
    let deadline = &snapshot.deadline_data;
    let load = &snapshot.load_status_data;
    let mut out = String::new();

    out.push_str(&format!("{}\n", "[QUALITY]".cyan()));
    out.push_str(&format!("  Pass rate:      {:.1}%\n", snapshot.pass_rate));
    out.push_str(&format!("  Avg deviation:  {:.2}\n", snapshot.avg_deviation));
    out.push_str(&format!("  Processing:     {:.1} h\n", snapshot.processing_time));
    out.push_str(&format!("{}\n", "[DEADLINE]".cyan()));
    out.push_str(&format!("  Remaining:      {:.1} h\n", deadline.time_remaining));
    out.push_str(&format!("  Risk:           {}\n", risk(deadline.risk_level)));
    out.push_str(&format!(
        "  Historical:     {:.1} h\n",
        deadline.historical_completion_time
    ));
    out.push_str(&format!("{}\n", "[LOAD]".cyan()));
    out.push_str(&format!("  Status:         {}\n", load_status(load.status)));
    if let Some(b) = load.bottleneck {
        out.push_str(&format!("  Bottleneck:     {}\n", b));
    }
    out.push_str(&format!(
        "  Utilization:    {:.0}%\n",
        load.resource_utilization
    ));
    out
}

fn metric_row(reading: &MetricReading) -> String {
    let status = if reading.status.is_best() {
        reading.status.green().to_string()
    } else {
        reading.status.yellow().to_string()
    };
    format!("  {:<16}{:>10}  {}", reading.label, reading.value, status)
}

fn insight_row(insight: &Insight) -> String {
    let tag = match insight.severity {
        Severity::Critical => "[CRITICAL]".red().bold().to_string(),
        Severity::Warning => "[WARNING]".yellow().to_string(),
        Severity::Good => "[OK]".green().to_string(),
    };
    format!(
        "  {} {}\n      {} {}",
        tag,
        insight.message,
        "->".dimmed(),
        insight.action
    )
}

/// Render one transcript entry; collapsed messages show only their text
pub fn message(msg: &AssistantMessage) -> String {
    let who = match msg.sender {
        Sender::User => msg.sender.bold().to_string(),
        Sender::Assistant => msg.sender.magenta().bold().to_string(),
    };
    let mut out = format!(
        "{} {} {}\n{}",
        who,
        msg.timestamp.format("%H:%M:%S").dimmed(),
        short_id(&msg.id).dimmed(),
        msg.text()
    );

    match &msg.body {
        MessageBody::Text { .. } => {}
        _ if !msg.expanded => {
            out.push_str(&format!("\n  {}", "(collapsed, use 'expand <id>')".dimmed()));
        }
        MessageBody::Analysis { analysis, .. } => {
            for reading in &analysis.metrics {
                out.push('\n');
                out.push_str(&metric_row(reading));
            }
            if !analysis.recommendations.is_empty() {
                out.push_str(&format!("\n{}", "Recommendations:".bold()));
                for rec in &analysis.recommendations {
                    out.push_str(&format!("\n  • {}", rec));
                }
            }
        }
        MessageBody::Insight { insights, .. } => {
            for insight in insights {
                out.push('\n');
                out.push_str(&insight_row(insight));
            }
        }
    }
    out
}

pub fn notification(n: &Notification) -> String {
    let kind = match n.kind {
        NotificationKind::Info => n.kind.blue().to_string(),
        NotificationKind::Success => n.kind.green().to_string(),
        NotificationKind::Warning => n.kind.yellow().to_string(),
        NotificationKind::Error => n.kind.red().to_string(),
    };
    let marker = if n.read { " " } else { "*" };
    format!(
        "{} {} {} [{}] {}",
        marker,
        short_id(&n.id).dimmed(),
        n.timestamp.format("%H:%M:%S"),
        kind,
        n.message
    )
}

pub fn separator() -> &'static str {
    THIN_SEP
}

#[cfg(test)]
mod tests {
    use super::*;
    use coa_shared::analysis::{AnalysisResult, MetricTier};

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn test_snapshot_block_hides_missing_bottleneck() {
        let block = snapshot_block(&MetricsSnapshot::baseline());
        assert!(block.contains("97.0%"));
        assert!(!block.contains("Bottleneck"));
    }

    #[test]
    fn test_collapsed_message_hides_payload() {
        let mut msg = AssistantMessage::assistant(MessageBody::Analysis {
            text: "Analysis".to_string(),
            analysis: AnalysisResult {
                summary: "Analysis".to_string(),
                metrics: vec![MetricReading {
                    label: "Pass Rate".to_string(),
                    value: "97.0%".to_string(),
                    status: MetricTier::Excellent,
                }],
                recommendations: vec!["Keep going".to_string()],
            },
        });
        assert!(message(&msg).contains("Pass Rate"));
        assert!(message(&msg).contains("Keep going"));

        msg.expanded = false;
        let collapsed = message(&msg);
        assert!(!collapsed.contains("Pass Rate"));
        assert!(collapsed.contains("expand"));
    }

    #[test]
    fn test_notification_unread_marker() {
        let mut n = Notification::new("Deadline at risk", NotificationKind::Warning);
        assert!(notification(&n).starts_with('*'));
        n.read = true;
        assert!(notification(&n).starts_with(' '));
    }
}
