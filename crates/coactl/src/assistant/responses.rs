//! Canned replies for intents that need no data.

use super::intent::Intent;

pub const WELCOME: &str = "Hello! I'm your CoA Assistant. I can help you with:\n\
• Analyzing pipeline performance\n\
• Spotting trends and insights\n\
• Checking CoA status\n\
• Understanding notifications\n\n\
How can I assist you today?";

const GREETING: &str = "Hello! I'm watching the CoA pipeline for you.\n\
Ask me to analyze the current metrics or for the latest insights.";

const STATUS_HELP: &str = "You can check the status of a CoA in the dashboard.\n\
Each CoA is shown as Approved, Rejected, or Pending.\n\
Pipeline status (pending, processing, completed, delayed) streams live with every update.";

const NOTIFICATION_HELP: &str = "Notifications are sent automatically when a CoA status changes.\n\
Make sure your email is registered in the system.\n\
High deadline risk and critical findings raise a notification as well.";

const GENERAL_HELP: &str = "I can help you with:\n\
• Checking CoA status\n\
• Understanding notifications\n\
• Creating new CoAs\n\
• Analyzing metrics and trends\n\
• Explaining the live data feed";

const DATA_HELP: &str = "The live feed reports, on every update:\n\
• Pass rate (%)\n\
• Average deviation\n\
• Processing time (hours)\n\
• Deadline time remaining and risk level\n\
• Queue status, bottleneck and resource utilization\n\n\
Ask for an analysis or insights to interpret the latest reading.";

const CREATE_HELP: &str = "To create a new CoA:\n\
1. Open New CoA from the dashboard\n\
2. Enter product, batch number and manufacturer\n\
3. Add each specification with its method, result and limits\n\
4. Submit for approval; approvers are notified automatically";

const FALLBACK: &str = "I'm here to help with any questions about the CoA system. You can ask about:\n\
• Analysis\n\
• Trends and insights\n\
• Status checks\n\
• Notifications\n\
• Creating new CoAs\n\n\
What would you like to know?";

/// Fixed text for a data-free intent.
///
/// Analysis and insight replies are built from metrics elsewhere; asked
/// here they get the fallback text.
pub fn canned_reply(intent: Intent) -> &'static str {
    match intent {
        Intent::Greeting => GREETING,
        Intent::StatusHelp => STATUS_HELP,
        Intent::NotificationHelp => NOTIFICATION_HELP,
        Intent::GeneralHelp => GENERAL_HELP,
        Intent::DataHelp => DATA_HELP,
        Intent::CreateHelp => CREATE_HELP,
        Intent::Analysis | Intent::Insight | Intent::Fallback => FALLBACK,
    }
}
