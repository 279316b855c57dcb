//! Append-only log of the current chat session.

use crate::state::ChatMessage;

/// Ordered chat history; the whole log is sent to the backend on every turn.
///
/// Messages are never edited or removed individually. `reset` drops the whole
/// session at once.
#[derive(Debug, Default, Clone)]
pub struct ConversationStore {
    messages: Vec<ChatMessage>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: ChatMessage) {
        tracing::debug!(
            role = message.role.as_str(),
            index = self.messages.len(),
            "conversation append"
        );
        self.messages.push(message);
    }

    pub fn all(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Owned copy of the log, used as a request snapshot.
    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.messages.clone()
    }

    pub fn reset(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}
