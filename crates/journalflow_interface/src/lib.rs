//! Collaborator contracts for the JournalFlow pipeline core.
//!
//! The pipeline core depends on these traits only; concrete implementations
//! live in `journalflow_database` (PostgreSQL), `journalflow_models` (LLM
//! providers), and `journalflow_pipeline::memory` (in-memory, for tests and
//! local runs).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;
mod types;

pub use traits::{ChatDriver, CodeActionHandler, ConfigStore, EntityStore, Transcriber, UsageLedger};
pub use types::{CycleReport, DispatchOutcome};
