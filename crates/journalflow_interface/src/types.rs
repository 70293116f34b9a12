//! Result types shared across pipeline crates.

use journalflow_core::ActionContext;
use serde_json::Value as JsonValue;

/// Result of one action dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    /// The context after the action ran. For ai_llm actions the shape is
    /// unchanged; code actions may have extended it.
    pub context: ActionContext,
    /// Parsed LLM response body for ai_llm actions; `None` for code actions.
    pub response: Option<JsonValue>,
}

/// Summary of one driver poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, derive_getters::Getters)]
pub struct CycleReport {
    /// Entities transcribed from status `new`
    transcribed: usize,
    /// Status advances applied after successful dispatches
    advanced: usize,
    /// Dispatches that failed and left status unchanged
    failed: usize,
    /// Entities skipped because no process step is configured
    skipped: usize,
}

impl CycleReport {
    /// Record a transcription.
    pub fn record_transcribed(&mut self) {
        self.transcribed += 1;
    }

    /// Record a successful step with status advance.
    pub fn record_advanced(&mut self) {
        self.advanced += 1;
    }

    /// Record a failed dispatch.
    pub fn record_failed(&mut self) {
        self.failed += 1;
    }

    /// Record an entity with no configured steps.
    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }
}
