//! Conversation session: append-only transcript of user and assistant
//! messages.

use super::responses::WELCOME;
use super::Assistant;
use coa_shared::message::{AssistantMessage, MessageBody};
use coa_shared::MetricsSnapshot;

pub struct Conversation {
    assistant: Assistant,
    messages: Vec<AssistantMessage>,
}

impl Conversation {
    /// New session, opened by the assistant's welcome message
    pub fn new(assistant: Assistant) -> Self {
        Self {
            assistant,
            messages: vec![AssistantMessage::assistant(MessageBody::text(WELCOME))],
        }
    }

    pub fn messages(&self) -> &[AssistantMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Send one user input and append the reply.
    ///
    /// Blank input is rejected before reaching the assistant: nothing is
    /// appended and `None` is returned.
    pub async fn send(
        &mut self,
        input: &str,
        snapshot: &MetricsSnapshot,
    ) -> Option<&AssistantMessage> {
        if input.trim().is_empty() {
            return None;
        }

        self.messages.push(AssistantMessage::user(input));
        let body = self.assistant.respond(input, snapshot).await;
        self.messages.push(AssistantMessage::assistant(body));
        self.messages.last()
    }

    /// Flip the display flag; returns the new value, `None` for unknown ids
    pub fn toggle_expanded(&mut self, id: &str) -> Option<bool> {
        let message = self.messages.iter_mut().find(|m| m.id == id)?;
        message.expanded = !message.expanded;
        Some(message.expanded)
    }

    /// Look up by full id or unique prefix
    pub fn find(&self, id_or_prefix: &str) -> Option<&AssistantMessage> {
        if id_or_prefix.is_empty() {
            return None;
        }
        let mut matches = self
            .messages
            .iter()
            .filter(|m| m.id.starts_with(id_or_prefix));
        match (matches.next(), matches.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }
}
