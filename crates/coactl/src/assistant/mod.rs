//! Rule-based assistant: keyword intents plus threshold analysis of the
//! latest metrics snapshot.
//!
//! The assistant never fails. Unknown input gets the fallback reply,
//! analysis and insight requests wait the configured thinking delay first.

pub mod analysis;
pub mod conversation;
pub mod insight;
pub mod intent;
pub mod responses;

pub use conversation::Conversation;
pub use intent::{classify_intent, Intent};

use coa_shared::message::MessageBody;
use coa_shared::MetricsSnapshot;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Processing time thresholds, in hours like the snapshot itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingThresholds {
    /// Below this the pipeline is fast
    #[serde(default = "default_fast_below")]
    pub fast_below_hours: f64,

    /// Below this (and not fast) it is normal; anything else is slow
    #[serde(default = "default_normal_below")]
    pub normal_below_hours: f64,

    /// Above this an elevated-processing warning is raised
    #[serde(default = "default_warn_above")]
    pub warn_above_hours: f64,
}

fn default_fast_below() -> f64 {
    2.5
}

fn default_normal_below() -> f64 {
    5.0
}

fn default_warn_above() -> f64 {
    4.0
}

impl Default for ProcessingThresholds {
    fn default() -> Self {
        Self {
            fast_below_hours: default_fast_below(),
            normal_below_hours: default_normal_below(),
            warn_above_hours: default_warn_above(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Pause before data-backed replies, in milliseconds
    #[serde(default = "default_thinking_delay")]
    pub thinking_delay_ms: u64,

    #[serde(default)]
    pub processing: ProcessingThresholds,
}

fn default_thinking_delay() -> u64 {
    1_500
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            thinking_delay_ms: default_thinking_delay(),
            processing: ProcessingThresholds::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Assistant {
    config: AssistantConfig,
}

impl Assistant {
    pub fn new(config: AssistantConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    /// Answer one input against the supplied snapshot
    pub async fn respond(&self, input: &str, snapshot: &MetricsSnapshot) -> MessageBody {
        let intent = classify_intent(input);
        debug!("Assistant intent={} for {:?}", intent, input);

        if intent.reads_metrics() && self.config.thinking_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.thinking_delay_ms)).await;
        }

        self.reply_for(intent, snapshot)
    }

    /// Synchronous core of `respond`, without the thinking delay
    pub fn reply_for(&self, intent: Intent, snapshot: &MetricsSnapshot) -> MessageBody {
        match intent {
            Intent::Analysis => {
                let result = analysis::analyze(snapshot, &self.config.processing);
                MessageBody::Analysis {
                    text: result.summary.clone(),
                    analysis: result,
                }
            }
            Intent::Insight => MessageBody::Insight {
                text: insight::INSIGHT_SUMMARY.to_string(),
                insights: insight::derive_insights(snapshot, &self.config.processing),
            },
            other => MessageBody::text(responses::canned_reply(other)),
        }
    }
}
