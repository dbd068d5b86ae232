//! Ordered, optionally size-bounded chat history.
//!
//! Two eviction policies exist: the plain variant drops the oldest message
//! (index 0) when full, the pinned variant always preserves index 0 -
//! typically the system prompt - and evicts index 1 instead.

use super::ChatMessage;

/// An ordered message log feeding the model.
#[derive(Debug, Clone, Default)]
pub struct ChatHistory {
    messages: Vec<ChatMessage>,
    total_length: Option<usize>,
    pin_first: bool,
}

impl ChatHistory {
    /// An unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// A history holding at most `total_length` messages; appending beyond
    /// that evicts the oldest message.
    pub fn bounded(total_length: usize) -> Self {
        Self {
            messages: Vec::new(),
            total_length: Some(total_length),
            pin_first: false,
        }
    }

    /// A bounded history that never evicts its first message.
    pub fn pinned(total_length: usize) -> Self {
        Self {
            messages: Vec::new(),
            total_length: Some(total_length),
            pin_first: true,
        }
    }

    /// Append a message, evicting per the configured policy when full.
    pub fn push(&mut self, msg: ChatMessage) {
        if let Some(limit) = self.total_length {
            if self.messages.len() >= limit && !self.messages.is_empty() {
                let evict_at = if self.pin_first && self.messages.len() > 1 {
                    1
                } else {
                    0
                };
                self.messages.remove(evict_at);
            }
        }
        self.messages.push(msg);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
