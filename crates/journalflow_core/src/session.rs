//! Chat session state for LLM conversations.

use crate::{ChatMessage, Role};
use serde::{Deserialize, Serialize};

/// A chat session seeded with a system prompt.
///
/// The session owns the ordered message history sent to the provider.
/// Resetting drops everything except the system message.
///
/// # Examples
///
/// ```
/// use journalflow_core::{ChatSession, Role};
///
/// let mut session = ChatSession::new("You are a helpful assistant.");
/// session.push(Role::User, "Classify: hello");
/// assert_eq!(session.messages().len(), 2);
///
/// session.reset();
/// assert_eq!(session.messages().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    system_prompt: String,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    /// Create a session seeded with the given system prompt.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        let system_prompt = system_prompt.into();
        let messages = vec![ChatMessage::new(Role::System, system_prompt.clone())];
        Self {
            system_prompt,
            messages,
        }
    }

    /// Append a message to the history.
    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(ChatMessage::new(role, content));
    }

    /// The ordered message history, system message first.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The system prompt the session was seeded with.
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Drop all messages except the system message.
    pub fn reset(&mut self) {
        self.messages = vec![ChatMessage::new(Role::System, self.system_prompt.clone())];
    }
}

/// The unified provider response: text plus token accounting.
///
/// # Examples
///
/// ```
/// use journalflow_core::ChatResponse;
///
/// let response = ChatResponse {
///     text: "{\"category\":\"greeting\"}".to_string(),
///     prompt_token_count: 42,
///     response_token_count: 7,
/// };
/// assert_eq!(response.response_token_count, 7);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The generated text
    pub text: String,
    /// Tokens consumed by the prompt
    pub prompt_token_count: i64,
    /// Tokens generated in the response
    pub response_token_count: i64,
}
