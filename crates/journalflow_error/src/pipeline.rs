//! Pipeline error types.

/// Specific error conditions for pipeline execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum PipelineErrorKind {
    /// No action definition exists for the label (neither ai_llm nor code)
    #[display("No action configured for label '{}'", _0)]
    UnknownAction(String),
    /// Required prompt parameters could not be resolved
    #[display("Missing required prompt parameters: {}", _0.join(", "))]
    MissingParameters(Vec<String>),
    /// Prompt template not found for label
    #[display("No prompt template configured for label '{}'", _0)]
    UnknownPrompt(String),
    /// LLM response body could not be parsed as structured data
    #[display("Malformed LLM response: {}", _0)]
    MalformedResponse(String),
    /// A single output key failed to apply
    #[display("Failed to apply output key '{}': {}", key, message)]
    OutputApplication {
        /// Output key from the mapping row
        key: String,
        /// Underlying failure
        message: String,
    },
    /// Output mapping declares versioned_json but no json_key
    #[display("Output mapping for key '{}' is versioned_json but has no json_key", _0)]
    MissingJsonKey(String),
    /// Code action handler not registered
    #[display("No code action handler registered for '{}::{}'", module, entry)]
    UnregisteredHandler {
        /// Module reference from the action definition
        module: String,
        /// Entry point from the action definition
        entry: String,
    },
    /// Code action handler failed
    #[display("Code action '{}' failed: {}", _0, _1)]
    HandlerFailed(String, String),
    /// Usage ledger write failed
    #[display("Usage ledger write failed: {}", _0)]
    LedgerWrite(String),
    /// Template scanning or substitution failed
    #[display("Template error: {}", _0)]
    Template(String),
    /// Entity row not found in the store
    #[display("Entity {} not found", _0)]
    EntityNotFound(i64),
    /// Write addressed a table the store does not manage
    #[display("Unknown write target '{}'", _0)]
    UnknownWriteTarget(String),
    /// Write addressed a column the store does not manage
    #[display("Unknown column '{}'", _0)]
    UnknownColumn(String),
}

/// Error type for pipeline execution.
///
/// # Examples
///
/// ```
/// use journalflow_error::{PipelineError, PipelineErrorKind};
///
/// let err = PipelineError::new(PipelineErrorKind::MissingParameters(vec![
///     "transcription".to_string(),
/// ]));
/// assert!(format!("{}", err).contains("transcription"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The specific error condition
    pub kind: PipelineErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new PipelineError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
