use serde::{Deserialize, Serialize};

use crate::Role;

/// Reply sent in place of a generated one when generation or validation fails.
pub const DEFAULT_FALLBACK_REPLY: &str = "I'm sorry, I can't answer that right now. \
Please try again in a moment.";

/// A role-tagged message sent to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: Role,
    pub text: String,
}

/// Structured completion request: system instructions plus the ordered
/// conversation, ending with the current user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRequest {
    pub system: String,
    pub messages: Vec<PromptMessage>,
}

impl PromptRequest {
    /// Total characters across the system block and all messages.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.system.chars().count()
            + self
                .messages
                .iter()
                .map(|m| m.text.chars().count())
                .sum::<usize>()
    }
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub usage: Option<Usage>,
}

impl Completion {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}
