//! LLM provider error types.

/// Specific error conditions for LLM provider calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ModelsErrorKind {
    /// HTTP transport failure
    #[display("HTTP error: {}", _0)]
    Http(String),
    /// Provider API returned an error response
    #[display("API error {}: {}", status, message)]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },
    /// Provider rate limit hit
    #[display("Rate limit exceeded")]
    RateLimit,
    /// Required API key not present in the environment
    #[display("API key not set: {}", _0)]
    ApiKeyMissing(String),
    /// Response body could not be converted to the expected shape
    #[display("Response conversion error: {}", _0)]
    ResponseConversion(String),
    /// Provider name not supported by the factory
    #[display("Unsupported provider: {}", _0)]
    UnsupportedProvider(String),
}

/// Error type for LLM provider operations.
///
/// # Examples
///
/// ```
/// use journalflow_error::{ModelsError, ModelsErrorKind};
///
/// let err = ModelsError::new(ModelsErrorKind::RateLimit);
/// assert!(format!("{}", err).contains("Rate limit"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Models Error: {} at line {} in {}", kind, line, file)]
pub struct ModelsError {
    /// The specific error condition
    pub kind: ModelsErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ModelsError {
    /// Create a new ModelsError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ModelsErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
