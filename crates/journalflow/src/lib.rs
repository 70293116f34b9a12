//! JournalFlow: a configurable audio-message processing pipeline.
//!
//! Audio messages are transcribed, classified, and enriched by a sequence of
//! runtime-configured actions. What runs next is data, not code: process
//! steps, prompts, and output mappings live in configuration tables, and
//! every LLM invocation is recorded in an append-only usage ledger.
//!
//! This crate is the facade: it re-exports the workspace API and carries the
//! `journalflow` binary.
//!
//! # Example
//!
//! ```rust,ignore
//! use journalflow::{
//!     establish_pool, ActionDispatcher, CodeActionRegistry, OpenAiChatClient,
//!     OpenAiTranscriber, PipelineDriver, PostgresConfigStore, PostgresEntityStore,
//!     PostgresUsageLedger,
//! };
//! use std::sync::Arc;
//!
//! let pool = establish_pool()?;
//! let config = Arc::new(PostgresConfigStore::new(pool.clone()));
//! let entities = Arc::new(PostgresEntityStore::new(pool.clone()));
//! let ledger = Arc::new(PostgresUsageLedger::new(pool));
//! let registry = Arc::new(CodeActionRegistry::new());
//!
//! let dispatcher = ActionDispatcher::new(config.clone(), entities.clone(), ledger, registry)
//!     .with_driver("openai", Arc::new(OpenAiChatClient::new()?));
//! let driver = PipelineDriver::new(
//!     config,
//!     entities,
//!     Arc::new(OpenAiTranscriber::new()?),
//!     dispatcher,
//!     "audio_message",
//! );
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cli;

pub use cli::{Cli, Commands};

// Core data types
pub use journalflow_core::{
    ActionContext, ActionDefinition, AiLlmAction, AudioMessage, ChatMessage, ChatResponse,
    ChatSession, CodeAction, ColumnType, HandlerKey, OutputMapping, ProcessStep, PromptParameter,
    PromptTemplate, Role, UsageRecord, UsageStatus, VersionedDocument, VersionedEntry,
    VersionedEnvelope, WriteMode, WriteTarget,
};

// Errors
pub use journalflow_error::{
    ConfigError, DatabaseError, JournalflowError, JournalflowErrorKind, JournalflowResult,
    ModelsError, PipelineError, TranscribeError,
};

// Collaborator traits
pub use journalflow_interface::{
    ChatDriver, CodeActionHandler, ConfigStore, CycleReport, DispatchOutcome, EntityStore,
    Transcriber, UsageLedger,
};

// Pipeline
pub use journalflow_pipeline::{
    ActionDispatcher, CodeActionRegistry, FnHandler, InMemoryConfigStore, InMemoryEntityStore,
    InMemoryUsageLedger, OutputApplicator, PipelineDriver, PromptRenderer,
};

// Provider clients
pub use journalflow_models::{
    create_chat_driver, create_transcriber, OpenAiChatClient, OpenAiTranscriber,
};

// Database stores
pub use journalflow_database::{
    establish_pool, run_migrations, PgPool, PostgresConfigStore, PostgresEntityStore,
    PostgresUsageLedger,
};
