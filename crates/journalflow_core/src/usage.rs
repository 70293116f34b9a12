//! Usage audit records for LLM invocations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on stored error message length, in characters.
pub const MAX_ERROR_MESSAGE_LEN: usize = 1000;

/// Outcome of a recorded LLM invocation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UsageStatus {
    /// The call completed and produced a usable response
    #[display("success")]
    Success,
    /// The call or its aftermath failed
    #[display("error")]
    Error,
}

/// One append-only ledger entry per LLM invocation, success or failure.
///
/// # Examples
///
/// ```
/// use journalflow_core::{UsageRecord, UsageStatus};
///
/// let record = UsageRecord::builder()
///     .entity_type("audio_message")
///     .entity_id(1)
///     .model_name("gpt-4.1")
///     .prompt_label("classify_message")
///     .prompt_text("Classify: hi")
///     .response_text(Some("{\"category\":\"greeting\"}".to_string()))
///     .prompt_token_count(12)
///     .response_token_count(8)
///     .response_duration_ms(350)
///     .temperature(0.0)
///     .status(UsageStatus::Success)
///     .build()
///     .unwrap();
/// assert_eq!(record.status, UsageStatus::Success);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_builder::Builder)]
#[builder(setter(into))]
pub struct UsageRecord {
    /// Entity type the action ran against
    pub entity_type: String,
    /// Entity identifier
    pub entity_id: i64,
    /// Model the call was issued with
    pub model_name: String,
    /// Prompt label that was rendered
    pub prompt_label: String,
    /// The rendered prompt as sent to the provider
    pub prompt_text: String,
    /// Response body; `None` on failure
    #[builder(default)]
    pub response_text: Option<String>,
    /// Tokens consumed by the prompt; zero on failure
    #[builder(default)]
    pub prompt_token_count: i64,
    /// Tokens generated in the response; zero on failure
    #[builder(default)]
    pub response_token_count: i64,
    /// Wall-clock call duration in milliseconds
    #[builder(default)]
    pub response_duration_ms: i64,
    /// Sampling temperature of the call
    pub temperature: f32,
    /// Success or error
    pub status: UsageStatus,
    /// Failure description, truncated to [`MAX_ERROR_MESSAGE_LEN`]
    #[builder(default, setter(custom))]
    pub error_message: Option<String>,
    /// Record creation timestamp
    #[builder(default = "Utc::now()")]
    pub recorded_at: DateTime<Utc>,
}

impl UsageRecord {
    /// Start building a record.
    pub fn builder() -> UsageRecordBuilder {
        UsageRecordBuilder::default()
    }
}

impl UsageRecordBuilder {
    /// Set the error message, truncating to [`MAX_ERROR_MESSAGE_LEN`]
    /// characters on a character boundary.
    pub fn error_message(&mut self, message: impl Into<String>) -> &mut Self {
        let message: String = message.into();
        self.error_message = Some(Some(truncate_chars(&message, MAX_ERROR_MESSAGE_LEN)));
        self
    }
}

/// Truncate `s` to at most `max` characters, respecting char boundaries.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
