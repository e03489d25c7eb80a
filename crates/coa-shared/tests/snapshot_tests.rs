//! Wire compatibility tests for metrics snapshots.

use approx::assert_relative_eq;
use coa_shared::metrics::{Bottleneck, LoadStatus, RiskLevel};
use coa_shared::{parse_snapshot, CoaError, MetricsSnapshot};

/// Payload shaped exactly like a browser-side producer emits it
const BROWSER_PAYLOAD: &str = r#"{
    "passRate": 96.41,
    "avgDeviation": 0.87,
    "processingTime": 2.51,
    "timestamp": "2024-03-05T10:15:30.123Z",
    "deadlineData": {
        "timeRemaining": 22.9,
        "riskLevel": "low",
        "historicalCompletionTime": 2.3
    },
    "loadStatusData": {
        "status": "processing",
        "bottleneck": "quality_check",
        "resourceUtilization": 83.2
    }
}"#;

#[test]
fn test_parse_browser_payload() {
    let snapshot = parse_snapshot(BROWSER_PAYLOAD).unwrap();
    assert_relative_eq!(snapshot.pass_rate, 96.41);
    assert_relative_eq!(snapshot.processing_time, 2.51);
    assert_eq!(snapshot.deadline_data.risk_level, RiskLevel::Low);
    assert_eq!(snapshot.load_status_data.status, LoadStatus::Processing);
    assert_eq!(
        snapshot.load_status_data.bottleneck,
        Some(Bottleneck::QualityCheck)
    );
    assert_eq!(snapshot.timestamp.timestamp_subsec_millis(), 123);
}

#[test]
fn test_roundtrip_keeps_values() {
    let original = parse_snapshot(BROWSER_PAYLOAD).unwrap();
    let json = original.to_json().unwrap();
    let parsed = parse_snapshot(&json).unwrap();
    assert_eq!(parsed, original);
}

#[test]
fn test_unknown_enum_value_is_payload_error() {
    let payload = BROWSER_PAYLOAD.replace("\"quality_check\"", "\"CPU\"");
    assert!(matches!(parse_snapshot(&payload), Err(CoaError::Payload(_))));
}

#[test]
fn test_null_number_is_payload_error() {
    let payload = BROWSER_PAYLOAD.replace("96.41", "null");
    assert!(matches!(parse_snapshot(&payload), Err(CoaError::Payload(_))));
}

#[test]
fn test_baseline_snapshot_passes_validation() {
    let json = MetricsSnapshot::baseline().to_json().unwrap();
    assert!(parse_snapshot(&json).is_ok());
}
