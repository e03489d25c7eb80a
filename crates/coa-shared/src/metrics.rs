//! Metrics snapshot: the one message type on the wire.
//!
//! Field names are camelCase on the wire. Processing time and time remaining
//! are expressed in hours.

use crate::error::CoaError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Baseline pass rate, percent
pub const BASE_PASS_RATE: f64 = 97.0;
/// Baseline average deviation
pub const BASE_DEVIATION: f64 = 0.8;
/// Baseline processing time, hours. Also reported as historical completion time.
pub const BASE_PROCESSING_TIME: f64 = 2.3;
/// Baseline time remaining before the deadline, hours
pub const BASE_TIME_REMAINING: f64 = 24.0;

/// Pass rate is clamped to this range
pub const PASS_RATE_MIN: f64 = 90.0;
pub const PASS_RATE_MAX: f64 = 100.0;
/// Processing time never drops below one hour
pub const PROCESSING_TIME_MIN: f64 = 1.0;

/// Slack ratio above which deadline risk is low
const LOW_RISK_RATIO: f64 = 3.0;
/// Slack ratio above which deadline risk is medium
const MEDIUM_RISK_RATIO: f64 = 1.5;

/// Deadline risk tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Tier from remaining time relative to processing time, not absolute hours.
    ///
    /// Ratio above 3 is low, above 1.5 is medium, anything else is high.
    /// A zero or negative processing time yields an infinite or NaN ratio;
    /// NaN compares false everywhere and lands on high.
    pub fn from_slack(time_remaining: f64, processing_time: f64) -> Self {
        let ratio = time_remaining / processing_time;
        if ratio > LOW_RISK_RATIO {
            RiskLevel::Low
        } else if ratio > MEDIUM_RISK_RATIO {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        write!(f, "{}", s)
    }
}

/// Queue status of the production pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    Pending,
    Processing,
    Completed,
    Delayed,
}

impl std::fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Delayed => "delayed",
        };
        write!(f, "{}", s)
    }
}

/// Stage currently constraining throughput
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bottleneck {
    QualityCheck,
    Documentation,
    Approval,
    Shipping,
}

impl std::fmt::Display for Bottleneck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::QualityCheck => "quality_check",
            Self::Documentation => "documentation",
            Self::Approval => "approval",
            Self::Shipping => "shipping",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadlineData {
    /// Hours left before the deadline
    pub time_remaining: f64,
    pub risk_level: RiskLevel,
    /// Fixed baseline, hours
    pub historical_completion_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadStatusData {
    pub status: LoadStatus,
    /// Only set while `status` is processing
    pub bottleneck: Option<Bottleneck>,
    /// Percent, 0-100
    pub resource_utilization: f64,
}

/// One synthetic metrics reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub pass_rate: f64,
    pub avg_deviation: f64,
    /// Hours
    pub processing_time: f64,
    pub timestamp: DateTime<Utc>,
    pub deadline_data: DeadlineData,
    pub load_status_data: LoadStatusData,
}

impl MetricsSnapshot {
    /// Noise-free snapshot built from the baseline constants.
    ///
    /// Used when no live stream is available.
    pub fn baseline() -> Self {
        Self {
            pass_rate: BASE_PASS_RATE,
            avg_deviation: BASE_DEVIATION,
            processing_time: BASE_PROCESSING_TIME,
            timestamp: Utc::now(),
            deadline_data: DeadlineData {
                time_remaining: BASE_TIME_REMAINING,
                risk_level: RiskLevel::from_slack(BASE_TIME_REMAINING, BASE_PROCESSING_TIME),
                historical_completion_time: BASE_PROCESSING_TIME,
            },
            load_status_data: LoadStatusData {
                status: LoadStatus::Processing,
                bottleneck: None,
                resource_utilization: 70.0,
            },
        }
    }

    /// Check structural invariants a well-formed producer always upholds
    pub fn validate(&self) -> Result<(), CoaError> {
        let numbers = [
            ("passRate", self.pass_rate),
            ("avgDeviation", self.avg_deviation),
            ("processingTime", self.processing_time),
            ("timeRemaining", self.deadline_data.time_remaining),
            (
                "historicalCompletionTime",
                self.deadline_data.historical_completion_time,
            ),
            (
                "resourceUtilization",
                self.load_status_data.resource_utilization,
            ),
        ];
        for (name, value) in numbers {
            if !value.is_finite() {
                return Err(CoaError::InvalidSnapshot(format!(
                    "{} is not a finite number",
                    name
                )));
            }
        }

        if self.load_status_data.bottleneck.is_some()
            && self.load_status_data.status != LoadStatus::Processing
        {
            return Err(CoaError::InvalidSnapshot(format!(
                "bottleneck reported while status is {}",
                self.load_status_data.status
            )));
        }

        Ok(())
    }

    /// Serialize for the wire
    pub fn to_json(&self) -> Result<String, CoaError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Decode and validate one wire message
pub fn parse_snapshot(payload: &str) -> Result<MetricsSnapshot, CoaError> {
    let snapshot: MetricsSnapshot = serde_json::from_str(payload)?;
    snapshot.validate()?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_tiers() {
        assert_eq!(RiskLevel::from_slack(24.0, 2.3), RiskLevel::Low);
        assert_eq!(RiskLevel::from_slack(5.0, 2.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_slack(2.0, 2.0), RiskLevel::High);
    }

    #[test]
    fn test_risk_boundaries() {
        // Exactly 3 is not low, exactly 1.5 is not medium
        assert_eq!(RiskLevel::from_slack(6.0, 2.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_slack(3.0, 2.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_slack(6.02, 2.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_slack(0.0, 2.0), RiskLevel::High);
    }

    #[test]
    fn test_baseline_is_valid() {
        let snapshot = MetricsSnapshot::baseline();
        assert!(snapshot.validate().is_ok());
        assert_eq!(snapshot.deadline_data.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let json = MetricsSnapshot::baseline().to_json().unwrap();
        assert!(json.contains("\"passRate\""));
        assert!(json.contains("\"avgDeviation\""));
        assert!(json.contains("\"deadlineData\""));
        assert!(json.contains("\"historicalCompletionTime\""));
        assert!(json.contains("\"loadStatusData\""));
        assert!(json.contains("\"resourceUtilization\""));
        assert!(json.contains("\"riskLevel\":\"low\""));
        assert!(json.contains("\"bottleneck\":null"));
    }

    #[test]
    fn test_parse_rejects_bottleneck_outside_processing() {
        let mut snapshot = MetricsSnapshot::baseline();
        snapshot.load_status_data.status = LoadStatus::Delayed;
        snapshot.load_status_data.bottleneck = Some(Bottleneck::Approval);
        let json = serde_json::to_string(&snapshot).unwrap();

        let err = parse_snapshot(&json).unwrap_err();
        assert!(matches!(err, CoaError::InvalidSnapshot(_)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_snapshot("not json"),
            Err(CoaError::Payload(_))
        ));
        assert!(matches!(
            parse_snapshot(r#"{"passRate": 95}"#),
            Err(CoaError::Payload(_))
        ));
    }
}
