//! Insight rules over one metrics snapshot.

use super::ProcessingThresholds;
use coa_shared::analysis::{Insight, Severity};
use coa_shared::MetricsSnapshot;

pub const INSIGHT_SUMMARY: &str = "Here are the key insights from the latest metrics:";

/// Pass rate below this is critical
const CRITICAL_PASS_RATE: f64 = 80.0;
/// Average deviation above this warrants a warning
const WARN_DEVIATION: f64 = 5.0;

/// One insight per triggered rule, in rule order. With nothing triggered,
/// a single `good` insight.
pub fn derive_insights(snapshot: &MetricsSnapshot, thresholds: &ProcessingThresholds) -> Vec<Insight> {
    let mut insights = Vec::new();

    if snapshot.pass_rate < CRITICAL_PASS_RATE {
        insights.push(Insight {
            severity: Severity::Critical,
            message: format!(
                "Pass rate is critically low at {:.1}%",
                snapshot.pass_rate
            ),
            action: "Hold release of affected batches and open a root-cause investigation"
                .to_string(),
        });
    }

    if snapshot.avg_deviation > WARN_DEVIATION {
        insights.push(Insight {
            severity: Severity::Warning,
            message: format!(
                "Average deviation is high at {:.2}",
                snapshot.avg_deviation
            ),
            action: "Recalibrate instruments and review method validation records".to_string(),
        });
    }

    if snapshot.processing_time > thresholds.warn_above_hours {
        insights.push(Insight {
            severity: Severity::Warning,
            message: format!(
                "Processing time is elevated at {:.1} h",
                snapshot.processing_time
            ),
            action: "Check the approval queue and add reviewer capacity".to_string(),
        });
    }

    if insights.is_empty() {
        insights.push(Insight {
            severity: Severity::Good,
            message: "All metrics are within nominal ranges".to_string(),
            action: "No action required".to_string(),
        });
    }

    insights
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(pass_rate: f64, avg_deviation: f64, processing_time: f64) -> MetricsSnapshot {
        let mut s = MetricsSnapshot::baseline();
        s.pass_rate = pass_rate;
        s.avg_deviation = avg_deviation;
        s.processing_time = processing_time;
        s
    }

    #[test]
    fn test_elevated_processing_only() {
        let insights = derive_insights(&snapshot(85.0, 3.2, 750.0), &ProcessingThresholds::default());
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].severity, Severity::Warning);
        assert!(insights[0].message.contains("Processing time is elevated"));
    }

    #[test]
    fn test_nominal_snapshot_yields_single_good() {
        let insights = derive_insights(&MetricsSnapshot::baseline(), &ProcessingThresholds::default());
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].severity, Severity::Good);
    }

    #[test]
    fn test_all_rules_in_order() {
        let insights = derive_insights(&snapshot(70.0, 6.5, 9.0), &ProcessingThresholds::default());
        let severities: Vec<_> = insights.iter().map(|i| i.severity).collect();
        assert_eq!(
            severities,
            [Severity::Critical, Severity::Warning, Severity::Warning]
        );
        assert!(insights[1].message.contains("deviation"));
        assert!(insights[2].message.contains("Processing"));
    }

    #[test]
    fn test_thresholds_are_strict() {
        // 80 is not below 80, 5 is not above 5, 4.0 is not above 4.0
        let insights = derive_insights(&snapshot(80.0, 5.0, 4.0), &ProcessingThresholds::default());
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].severity, Severity::Good);
    }

    #[test]
    fn test_generator_range_never_warns_on_processing() {
        let t = ProcessingThresholds::default();
        for hours in [2.3, 2.55, 2.8] {
            let insights = derive_insights(&snapshot(97.0, 0.8, hours), &t);
            assert_eq!(insights[0].severity, Severity::Good);
        }
    }
}
