//! Analysis and insight payloads produced by the assistant.

use serde::{Deserialize, Serialize};

/// Tier assigned to one metric by the analysis rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricTier {
    // Pass rate
    Excellent,
    Good,
    #[serde(rename = "needs improvement")]
    NeedsImprovement,
    // Deviation
    Low,
    Moderate,
    High,
    // Processing time
    Fast,
    Normal,
    Slow,
}

impl MetricTier {
    /// Best tier of its dimension: nothing to recommend
    pub fn is_best(&self) -> bool {
        matches!(self, Self::Excellent | Self::Low | Self::Fast)
    }
}

impl std::fmt::Display for MetricTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::NeedsImprovement => "needs improvement",
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Fast => "fast",
            Self::Normal => "normal",
            Self::Slow => "slow",
        };
        write!(f, "{}", s)
    }
}

/// One labelled metric inside an analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricReading {
    pub label: String,
    /// Display value, unit included
    pub value: String,
    pub status: MetricTier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    pub metrics: Vec<MetricReading>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Warning,
    Good,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Critical => "critical",
            Self::Warning => "warning",
            Self::Good => "good",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub severity: Severity,
    pub message: String,
    /// Suggested next step
    pub action: String,
}
