//! Core data types for the JournalFlow audio pipeline.
//!
//! This crate provides the foundation data types used across all JournalFlow
//! interfaces: chat primitives, configuration records, the versioned-merge
//! document, usage audit records, and the audio-message entity.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod context;
mod entity;
mod message;
mod role;
mod session;
mod usage;
mod versioned;

pub use config::{
    ActionDefinition, AiLlmAction, CodeAction, ColumnType, HandlerKey, OutputMapping,
    ProcessStep, PromptParameter, PromptTemplate, WriteTarget, DEFAULT_MAX_LENGTH,
};
pub use context::ActionContext;
pub use entity::{AudioMessage, STATUS_COMPLETE, STATUS_NEW, STATUS_TRANSCRIBED};
pub use message::ChatMessage;
pub use role::Role;
pub use session::{ChatResponse, ChatSession};
pub use usage::{
    truncate_chars, UsageRecord, UsageRecordBuilder, UsageStatus, MAX_ERROR_MESSAGE_LEN,
};
pub use versioned::{VersionedDocument, VersionedEntry, VersionedEnvelope, WriteMode};
