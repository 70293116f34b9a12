//! Action dispatch, prompt rendering, output application, and the pipeline
//! driver for JournalFlow.
//!
//! This crate is the orchestration core: the driver polls entities by
//! status, the dispatcher resolves and executes configured actions, the
//! renderer turns prompt templates plus context into provider prompts, and
//! the output applicator merges parsed LLM responses back onto entities
//! with versioned-merge semantics.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod dispatcher;
mod driver;
mod memory;
mod output;
mod registry;
mod renderer;

pub use dispatcher::{ActionDispatcher, SYSTEM_PROMPT};
pub use driver::PipelineDriver;
pub use memory::{InMemoryConfigStore, InMemoryEntityStore, InMemoryUsageLedger};
pub use output::{OutputApplicator, PRODUCER_LLM};
pub use registry::{CodeActionRegistry, FnHandler};
pub use renderer::PromptRenderer;
