//! Top-level error wrapper types.

use crate::{ConfigError, ModelsError, PipelineError, TranscribeError};

#[cfg(feature = "database")]
use crate::DatabaseError;

/// This is the foundation error enum. Each JournalFlow crate contributes
/// a variant for its domain.
///
/// # Examples
///
/// ```
/// use journalflow_error::{JournalflowError, ConfigError};
///
/// let cfg_err = ConfigError::new("missing field");
/// let err: JournalflowError = cfg_err.into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum JournalflowErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Pipeline execution error
    #[from(PipelineError)]
    Pipeline(PipelineError),
    /// LLM provider error
    #[from(ModelsError)]
    Models(ModelsError),
    /// Transcription error
    #[from(TranscribeError)]
    Transcribe(TranscribeError),
    /// Database error
    #[cfg(feature = "database")]
    #[from(DatabaseError)]
    Database(DatabaseError),
}

/// JournalFlow error with kind discrimination.
///
/// # Examples
///
/// ```
/// use journalflow_error::{JournalflowResult, ConfigError};
///
/// fn might_fail() -> JournalflowResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("JournalFlow Error: {}", _0)]
pub struct JournalflowError(Box<JournalflowErrorKind>);

impl JournalflowError {
    /// Create a new error from a kind.
    pub fn new(kind: JournalflowErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &JournalflowErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to JournalflowErrorKind
impl<T> From<T> for JournalflowError
where
    T: Into<JournalflowErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for JournalFlow operations.
///
/// # Examples
///
/// ```
/// use journalflow_error::{JournalflowResult, ConfigError};
///
/// fn load_settings() -> JournalflowResult<String> {
///     Err(ConfigError::new("no settings file"))?
/// }
/// ```
pub type JournalflowResult<T> = std::result::Result<T, JournalflowError>;
