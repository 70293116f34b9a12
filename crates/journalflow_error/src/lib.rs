//! Error types for the JournalFlow audio pipeline.
//!
//! This crate provides the foundation error types used throughout the
//! JournalFlow workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use journalflow_error::{JournalflowResult, PipelineError, PipelineErrorKind};
//!
//! fn resolve_action() -> JournalflowResult<String> {
//!     Err(PipelineError::new(PipelineErrorKind::UnknownAction(
//!         "summarize".to_string(),
//!     )))?
//! }
//!
//! match resolve_action() {
//!     Ok(label) => println!("Resolved: {}", label),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
#[cfg(feature = "database")]
mod database;
mod error;
mod models;
mod pipeline;
mod transcribe;

pub use config::ConfigError;
#[cfg(feature = "database")]
pub use database::{DatabaseError, DatabaseErrorKind};
pub use error::{JournalflowError, JournalflowErrorKind, JournalflowResult};
pub use models::{ModelsError, ModelsErrorKind};
pub use pipeline::{PipelineError, PipelineErrorKind};
pub use transcribe::{TranscribeError, TranscribeErrorKind};
