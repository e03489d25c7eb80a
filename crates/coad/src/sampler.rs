//! Synthetic metrics sampler.
//!
//! Closed-form noise around fixed baselines, no fitted model. Each sampler
//! owns its RNG so subscribers draw independently; seed one for
//! reproducible sequences.

use chrono::Utc;
use coa_shared::metrics::{
    Bottleneck, DeadlineData, LoadStatus, LoadStatusData, MetricsSnapshot, RiskLevel,
    BASE_DEVIATION, BASE_PASS_RATE, BASE_PROCESSING_TIME, BASE_TIME_REMAINING, PASS_RATE_MAX,
    PASS_RATE_MIN, PROCESSING_TIME_MIN,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

/// Bottleneck draw; `None` is one of the five equally likely outcomes
const BOTTLENECK_CHOICES: [Option<Bottleneck>; 5] = [
    Some(Bottleneck::QualityCheck),
    Some(Bottleneck::Documentation),
    Some(Bottleneck::Approval),
    Some(Bottleneck::Shipping),
    None,
];

/// Resource utilization floor before noise, percent
const UTILIZATION_FLOOR: f64 = 70.0;

pub struct MetricsSampler {
    rng: StdRng,
}

impl MetricsSampler {
    /// Sampler seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sampler
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Produce one snapshot. Never fails.
    pub fn sample(&mut self) -> MetricsSnapshot {
        let pass_rate_variation = self.normal(0.0, 0.5);
        let deviation_variation = self.normal(0.0, 0.1).abs();
        let processing_time_variation = self.rng.gen::<f64>() * 0.5;
        let time_remaining_variation = self.rng.gen::<f64>() * 4.0 - 2.0;

        let pass_rate = (BASE_PASS_RATE + pass_rate_variation).clamp(PASS_RATE_MIN, PASS_RATE_MAX);
        let avg_deviation = (BASE_DEVIATION + deviation_variation).max(0.0);
        let processing_time = (BASE_PROCESSING_TIME + processing_time_variation).max(PROCESSING_TIME_MIN);
        let time_remaining = (BASE_TIME_REMAINING + time_remaining_variation).max(0.0);

        let status = self.status();
        let bottleneck = BOTTLENECK_CHOICES[self.rng.gen_range(0..BOTTLENECK_CHOICES.len())];
        let resource_utilization = (UTILIZATION_FLOOR + self.rng.gen::<f64>() * 30.0).clamp(0.0, 100.0);

        MetricsSnapshot {
            pass_rate,
            avg_deviation,
            processing_time,
            timestamp: Utc::now(),
            deadline_data: DeadlineData {
                time_remaining,
                risk_level: RiskLevel::from_slack(time_remaining, processing_time),
                historical_completion_time: BASE_PROCESSING_TIME,
            },
            load_status_data: LoadStatusData {
                status,
                // Drawn every time, surfaced only while processing
                bottleneck: if status == LoadStatus::Processing {
                    bottleneck
                } else {
                    None
                },
                resource_utilization,
            },
        }
    }

    /// Gaussian draw via Box-Muller
    fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u = self.nonzero_uniform();
        let v = self.nonzero_uniform();
        let z = (-2.0 * u.ln()).sqrt() * (2.0 * PI * v).cos();
        mean + std_dev * z
    }

    /// Uniform in (0, 1): ln(0) is undefined
    fn nonzero_uniform(&mut self) -> f64 {
        loop {
            let x: f64 = self.rng.gen();
            if x != 0.0 {
                return x;
            }
        }
    }

    fn status(&mut self) -> LoadStatus {
        status_for(self.rng.gen::<f64>())
    }
}

impl Default for MetricsSampler {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a uniform draw in [0, 1) to a queue status: 10% delayed,
/// 20% pending, 50% processing, 20% completed
pub fn status_for(r: f64) -> LoadStatus {
    if r < 0.1 {
        LoadStatus::Delayed
    } else if r < 0.3 {
        LoadStatus::Pending
    } else if r < 0.8 {
        LoadStatus::Processing
    } else {
        LoadStatus::Completed
    }
}
