//! Provider factories resolving config strings to chat and transcription
//! clients.

use crate::{OpenAiChatClient, OpenAiTranscriber};
use journalflow_error::{JournalflowResult, ModelsError, ModelsErrorKind};
use journalflow_interface::{ChatDriver, Transcriber};
use std::sync::Arc;

/// Creates the chat driver registered under an `ai_provider` key.
///
/// # Errors
///
/// Returns `UnsupportedProvider` for any key other than `"openai"`.
///
/// # Examples
///
/// ```no_run
/// use journalflow_models::create_chat_driver;
///
/// let driver = create_chat_driver("openai").unwrap();
/// assert_eq!(driver.provider_name(), "openai");
/// ```
pub fn create_chat_driver(provider: &str) -> JournalflowResult<Arc<dyn ChatDriver>> {
    match provider.to_lowercase().as_str() {
        "openai" => Ok(Arc::new(OpenAiChatClient::new()?)),
        other => Err(ModelsError::new(ModelsErrorKind::UnsupportedProvider(
            other.to_string(),
        ))
        .into()),
    }
}

/// Creates the transcription client registered under an engine key.
///
/// # Errors
///
/// Returns `UnsupportedProvider` for any key other than `"openai"`.
pub fn create_transcriber(engine: &str) -> JournalflowResult<Arc<dyn Transcriber>> {
    match engine.to_lowercase().as_str() {
        "openai" => Ok(Arc::new(OpenAiTranscriber::new()?)),
        other => Err(ModelsError::new(ModelsErrorKind::UnsupportedProvider(
            other.to_string(),
        ))
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use journalflow_error::JournalflowErrorKind;

    #[test]
    fn unknown_provider_is_rejected() {
        let err = create_chat_driver("acme").unwrap_err();
        match err.kind() {
            JournalflowErrorKind::Models(e) => {
                assert_eq!(
                    e.kind,
                    ModelsErrorKind::UnsupportedProvider("acme".to_string())
                );
            }
            other => panic!("unexpected error kind: {other}"),
        }
    }

    #[test]
    fn unknown_transcription_engine_is_rejected() {
        let err = create_transcriber("espeak").unwrap_err();
        match err.kind() {
            JournalflowErrorKind::Models(e) => {
                assert_eq!(
                    e.kind,
                    ModelsErrorKind::UnsupportedProvider("espeak".to_string())
                );
            }
            other => panic!("unexpected error kind: {other}"),
        }
    }
}
