//! Message types for conversation history.

use crate::Role;
use serde::{Deserialize, Serialize};

/// A single message in a chat conversation.
///
/// # Examples
///
/// ```
/// use journalflow_core::{ChatMessage, Role};
///
/// let message = ChatMessage::new(Role::User, "Classify this transcript");
/// assert_eq!(message.role, Role::User);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message sender
    pub role: Role,
    /// The text content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a new message.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}
