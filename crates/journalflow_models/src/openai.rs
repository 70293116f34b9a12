//! OpenAI-compatible chat completions client.

use async_trait::async_trait;
use journalflow_core::{ChatMessage, ChatResponse, ChatSession, Role};
use journalflow_error::{JournalflowResult, ModelsError, ModelsErrorKind};
use journalflow_interface::ChatDriver;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Default OpenAI API base URL.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Environment variable holding the API key.
const API_KEY_VAR: &str = "OPENAI_API_KEY";

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: i64,
    completion_tokens: i64,
}

/// Chat client for OpenAI and API-compatible providers.
///
/// Sends the full session history on every call and appends the assistant
/// reply to the session on success.
#[derive(Debug, Clone)]
pub struct OpenAiChatClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiChatClient {
    /// Creates a client against the OpenAI API.
    ///
    /// Reads the API key from `OPENAI_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is not set in the environment.
    #[instrument(skip_all)]
    pub fn new() -> JournalflowResult<Self> {
        let api_key = std::env::var(API_KEY_VAR).map_err(|_| {
            ModelsError::new(ModelsErrorKind::ApiKeyMissing(API_KEY_VAR.to_string()))
        })?;
        Ok(Self::with_api_key(api_key, OPENAI_BASE_URL))
    }

    /// Creates a client with an explicit API key and base URL, for
    /// API-compatible providers and tests.
    pub fn with_api_key(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ChatDriver for OpenAiChatClient {
    #[instrument(skip(self, session), fields(provider = "openai", model = %model))]
    async fn chat(
        &self,
        session: &mut ChatSession,
        model: &str,
        temperature: f32,
    ) -> JournalflowResult<ChatResponse> {
        let request = ChatCompletionRequest {
            model,
            messages: session.messages(),
            temperature,
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!(url = %url, "Sending chat completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                ModelsError::new(ModelsErrorKind::Http(format!("Request failed: {}", e)))
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(ModelsError::new(ModelsErrorKind::RateLimit).into());
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ModelsError::new(ModelsErrorKind::Api {
                status: status.as_u16(),
                message,
            })
            .into());
        }

        let body: ChatCompletionResponse = response.json().await.map_err(|e| {
            ModelsError::new(ModelsErrorKind::ResponseConversion(format!(
                "Failed to parse response: {}",
                e
            )))
        })?;

        let text = body
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| {
                ModelsError::new(ModelsErrorKind::ResponseConversion(
                    "Response contained no choices".to_string(),
                ))
            })?;

        session.push(Role::Assistant, text.clone());

        Ok(ChatResponse {
            text,
            prompt_token_count: body.usage.prompt_tokens,
            response_token_count: body.usage.completion_tokens,
        })
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_to_wire_shape() {
        let mut session = ChatSession::new("You are a helpful assistant.");
        session.push(Role::User, "Classify: hi");

        let request = ChatCompletionRequest {
            model: "gpt-4.1",
            messages: session.messages(),
            temperature: 0.0,
        };
        let wire = serde_json::to_value(&request).unwrap();
        assert_eq!(wire["model"], "gpt-4.1");
        assert_eq!(wire["messages"][0]["role"], "system");
        assert_eq!(wire["messages"][1]["role"], "user");
        assert_eq!(wire["messages"][1]["content"], "Classify: hi");
    }

    #[test]
    fn response_deserializes_content_and_usage() {
        let body = r#"{
            "choices": [{"message": {"role": "assistant", "content": " {\"x\":1} "}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        }"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content.trim(), r#"{"x":1}"#);
        assert_eq!(parsed.usage.prompt_tokens, 12);
        assert_eq!(parsed.usage.completion_tokens, 3);
    }
}
