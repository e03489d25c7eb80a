//! Threshold analysis of one metrics snapshot.

use super::ProcessingThresholds;
use coa_shared::analysis::{AnalysisResult, MetricReading, MetricTier};
use coa_shared::MetricsSnapshot;

pub const ANALYSIS_SUMMARY: &str = "Here's my analysis of the current pipeline performance:";

const PASS_RATE_RECOMMENDATION: &str =
    "Review failed specifications in recent batches to lift the pass rate above 90%";
const DEVIATION_RECOMMENDATION: &str =
    "Tighten method controls and recalibrate instruments to bring average deviation below 2.0";
const PROCESSING_RECOMMENDATION: &str =
    "Investigate the queue bottleneck and rebalance reviewers to shorten processing time";

pub fn pass_rate_tier(pass_rate: f64) -> MetricTier {
    if pass_rate > 90.0 {
        MetricTier::Excellent
    } else if pass_rate > 75.0 {
        MetricTier::Good
    } else {
        MetricTier::NeedsImprovement
    }
}

pub fn deviation_tier(avg_deviation: f64) -> MetricTier {
    if avg_deviation < 2.0 {
        MetricTier::Low
    } else if avg_deviation < 5.0 {
        MetricTier::Moderate
    } else {
        MetricTier::High
    }
}

/// Processing time tier; hours in, hour thresholds
pub fn processing_tier(processing_time: f64, thresholds: &ProcessingThresholds) -> MetricTier {
    if processing_time < thresholds.fast_below_hours {
        MetricTier::Fast
    } else if processing_time < thresholds.normal_below_hours {
        MetricTier::Normal
    } else {
        MetricTier::Slow
    }
}

/// Build the analysis: always three metrics (pass rate, deviation,
/// processing time), one recommendation per metric off its best tier
pub fn analyze(snapshot: &MetricsSnapshot, thresholds: &ProcessingThresholds) -> AnalysisResult {
    let readings = [
        (
            MetricReading {
                label: "Pass Rate".to_string(),
                value: format!("{:.1}%", snapshot.pass_rate),
                status: pass_rate_tier(snapshot.pass_rate),
            },
            PASS_RATE_RECOMMENDATION,
        ),
        (
            MetricReading {
                label: "Avg Deviation".to_string(),
                value: format!("{:.2}", snapshot.avg_deviation),
                status: deviation_tier(snapshot.avg_deviation),
            },
            DEVIATION_RECOMMENDATION,
        ),
        (
            MetricReading {
                label: "Processing Time".to_string(),
                value: format!("{:.1} h", snapshot.processing_time),
                status: processing_tier(snapshot.processing_time, thresholds),
            },
            PROCESSING_RECOMMENDATION,
        ),
    ];

    let recommendations = readings
        .iter()
        .filter(|(reading, _)| !reading.status.is_best())
        .map(|(_, rec)| rec.to_string())
        .collect();

    AnalysisResult {
        summary: ANALYSIS_SUMMARY.to_string(),
        metrics: readings.into_iter().map(|(reading, _)| reading).collect(),
        recommendations,
    }
}
