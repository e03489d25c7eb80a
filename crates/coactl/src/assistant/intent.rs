//! Keyword intent classifier.
//!
//! Substring containment on the lower-cased input. Rules are tested in
//! declaration order and the first hit wins, so overlapping keywords
//! ("analyze my data") resolve to the earlier rule.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Intent {
    Analysis,
    Insight,
    Greeting,
    StatusHelp,
    NotificationHelp,
    GeneralHelp,
    DataHelp,
    CreateHelp,
    Fallback,
}

impl Intent {
    /// Whether answering needs a metrics snapshot
    pub fn reads_metrics(&self) -> bool {
        matches!(self, Self::Analysis | Self::Insight)
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Analysis => "analysis",
            Self::Insight => "insight",
            Self::Greeting => "greeting",
            Self::StatusHelp => "status-help",
            Self::NotificationHelp => "notification-help",
            Self::GeneralHelp => "general-help",
            Self::DataHelp => "data-help",
            Self::CreateHelp => "create-help",
            Self::Fallback => "fallback",
        };
        write!(f, "{}", s)
    }
}

/// Keyword table, in priority order
const RULES: &[(Intent, &[&str])] = &[
    (Intent::Analysis, &["analysis", "analyze"]),
    (Intent::Insight, &["insight", "trend"]),
    (Intent::Greeting, &["hello", "hi", "hey"]),
    (Intent::StatusHelp, &["status"]),
    (Intent::NotificationHelp, &["notification"]),
    (Intent::GeneralHelp, &["help", "what can you do"]),
    (Intent::DataHelp, &["data", "analytics", "metrics", "statistics"]),
    (Intent::CreateHelp, &["create", "new"]),
];

/// Classify free text to an intent
pub fn classify_intent(input: &str) -> Intent {
    let q = input.to_lowercase();

    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| q.contains(k)))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::Fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_analysis() {
        assert_eq!(classify_intent("analyze trends"), Intent::Analysis);
        assert_eq!(classify_intent("Run an ANALYSIS"), Intent::Analysis);
    }

    #[test]
    fn test_classify_insight() {
        assert_eq!(classify_intent("any insights?"), Intent::Insight);
        assert_eq!(classify_intent("show me the trend"), Intent::Insight);
    }

    #[test]
    fn test_classify_greeting() {
        assert_eq!(classify_intent("hello"), Intent::Greeting);
        assert_eq!(classify_intent("Hey there"), Intent::Greeting);
        assert_eq!(classify_intent("hi"), Intent::Greeting);
    }

    #[test]
    fn test_classify_help_family() {
        assert_eq!(classify_intent("check status"), Intent::StatusHelp);
        assert_eq!(classify_intent("notifications?"), Intent::NotificationHelp);
        assert_eq!(classify_intent("help"), Intent::GeneralHelp);
        assert_eq!(classify_intent("what can you do"), Intent::GeneralHelp);
        assert_eq!(classify_intent("show data"), Intent::DataHelp);
        assert_eq!(classify_intent("open analytics"), Intent::DataHelp);
        assert_eq!(classify_intent("create a coa"), Intent::CreateHelp);
        assert_eq!(classify_intent("add a new batch"), Intent::CreateHelp);
    }

    #[test]
    fn test_classify_fallback() {
        assert_eq!(classify_intent("xyz123"), Intent::Fallback);
        assert_eq!(classify_intent(""), Intent::Fallback);
        assert_eq!(classify_intent("   "), Intent::Fallback);
    }

    /// Declaration order is the contract for overlapping keywords
    #[test]
    fn test_priority_order() {
        // analysis beats data, insight/trend and help
        assert_eq!(classify_intent("analyze my data"), Intent::Analysis);
        assert_eq!(classify_intent("analysis of trends"), Intent::Analysis);
        assert_eq!(classify_intent("help me analyze"), Intent::Analysis);
        // insight beats greeting and status
        assert_eq!(classify_intent("hello, any trends in status?"), Intent::Insight);
        // greeting beats status and help
        assert_eq!(classify_intent("hey, status please"), Intent::Greeting);
        assert_eq!(classify_intent("hello, I need help"), Intent::Greeting);
        // status beats notification
        assert_eq!(classify_intent("status of my notification"), Intent::StatusHelp);
        // notification beats help
        assert_eq!(classify_intent("notification help"), Intent::NotificationHelp);
        // help beats data and create
        assert_eq!(classify_intent("help creating data"), Intent::GeneralHelp);
        // data beats create/new
        assert_eq!(classify_intent("new data"), Intent::DataHelp);
    }

    /// Plain substring matching: "hi" inside another word still greets
    #[test]
    fn test_substring_semantics() {
        assert_eq!(classify_intent("shipping delays"), Intent::Greeting);
        assert_eq!(classify_intent("renewal"), Intent::CreateHelp);
    }

    #[test]
    fn test_reads_metrics() {
        assert!(Intent::Analysis.reads_metrics());
        assert!(Intent::Insight.reads_metrics());
        assert!(!Intent::Greeting.reads_metrics());
        assert!(!Intent::Fallback.reads_metrics());
    }
}
