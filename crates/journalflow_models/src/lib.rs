//! LLM provider and transcription clients for JournalFlow.
//!
//! This crate provides the OpenAI-compatible chat client backing ai_llm
//! actions, the transcription client backing the transcription stage, and
//! the provider factory resolving `ai_provider` config strings to drivers.
//!
//! # Example
//!
//! ```no_run
//! use journalflow_core::{ChatSession, Role};
//! use journalflow_interface::ChatDriver;
//! use journalflow_models::OpenAiChatClient;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAiChatClient::new()?;
//! let mut session = ChatSession::new("You are a helpful assistant.");
//! session.push(Role::User, "Classify: hello there");
//! let response = client.chat(&mut session, "gpt-4.1", 0.0).await?;
//! println!("{}", response.text);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod factory;
mod openai;
mod transcription;

pub use factory::{create_chat_driver, create_transcriber};
pub use openai::{OpenAiChatClient, OPENAI_BASE_URL};
pub use transcription::{OpenAiTranscriber, DEFAULT_TRANSCRIPTION_MODEL};
