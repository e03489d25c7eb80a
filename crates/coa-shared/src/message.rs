//! Conversation message model for the assistant.

use crate::analysis::{AnalysisResult, Insight};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "you"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// Message type discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    Analysis,
    Insight,
}

/// Message content. Closed set, every consumer matches exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageBody {
    Text {
        text: String,
    },
    Analysis {
        text: String,
        analysis: AnalysisResult,
    },
    Insight {
        text: String,
        insights: Vec<Insight>,
    },
}

impl MessageBody {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Text { .. } => MessageKind::Text,
            Self::Analysis { .. } => MessageKind::Analysis,
            Self::Insight { .. } => MessageKind::Insight,
        }
    }

    /// Headline text regardless of payload
    pub fn as_text(&self) -> &str {
        match self {
            Self::Text { text } | Self::Analysis { text, .. } | Self::Insight { text, .. } => text,
        }
    }

    pub fn has_payload(&self) -> bool {
        !matches!(self, Self::Text { .. })
    }
}

/// One entry of a conversation transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantMessage {
    /// Opaque unique token
    pub id: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub body: MessageBody,
    /// Display flag, the only mutable field
    #[serde(default)]
    pub expanded: bool,
}

impl AssistantMessage {
    pub fn new(sender: Sender, body: MessageBody) -> Self {
        // Payload-bearing replies open expanded
        let expanded = body.has_payload();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender,
            timestamp: Utc::now(),
            body,
            expanded,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, MessageBody::text(text))
    }

    pub fn assistant(body: MessageBody) -> Self {
        Self::new(Sender::Assistant, body)
    }

    pub fn kind(&self) -> MessageKind {
        self.body.kind()
    }

    pub fn text(&self) -> &str {
        self.body.as_text()
    }
}
