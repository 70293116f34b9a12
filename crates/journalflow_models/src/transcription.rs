//! OpenAI transcription client.

use async_trait::async_trait;
use journalflow_error::{JournalflowResult, ModelsError, ModelsErrorKind, TranscribeError,
    TranscribeErrorKind};
use journalflow_interface::Transcriber;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::path::Path;
use tracing::{debug, instrument};

use crate::OPENAI_BASE_URL;

/// Default speech-to-text model.
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";

/// Environment variable holding the API key.
const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Speech-to-text client over the OpenAI audio transcriptions endpoint.
///
/// Uploads the audio file as multipart form data and returns the plain-text
/// transcription.
#[derive(Debug, Clone)]
pub struct OpenAiTranscriber {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiTranscriber {
    /// Creates a transcriber with the default model.
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
        Ok(Self::with_api_key(
            api_key,
            OPENAI_BASE_URL,
            DEFAULT_TRANSCRIPTION_MODEL,
        ))
    }

    /// Creates a transcriber with an explicit API key, base URL, and model.
    pub fn with_api_key(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl Transcriber for OpenAiTranscriber {
    #[instrument(skip(self), fields(model = %self.model))]
    async fn transcribe(&self, path: &Path) -> JournalflowResult<String> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            TranscribeError::new(TranscribeErrorKind::FileRead {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name))
            .text("model", self.model.clone())
            .text("response_format", "text");

        let url = format!("{}/audio/transcriptions", self.base_url);
        debug!(url = %url, path = %path.display(), "Sending transcription request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                TranscribeError::new(TranscribeErrorKind::Service(format!(
                    "Request failed: {}",
                    e
                )))
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TranscribeError::new(TranscribeErrorKind::Service(format!(
                "API error {}: {}",
                status.as_u16(),
                message
            )))
            .into());
        }

        let text = response.text().await.map_err(|e| {
            TranscribeError::new(TranscribeErrorKind::Service(format!(
                "Failed to read response body: {}",
                e
            )))
        })?;

        Ok(text.trim().to_string())
    }
}
