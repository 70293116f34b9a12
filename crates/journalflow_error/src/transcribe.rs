//! Transcription error types.

/// Specific error conditions for audio transcription.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum TranscribeErrorKind {
    /// Audio file could not be read
    #[display("Failed to read audio file '{}': {}", path, message)]
    FileRead {
        /// Path to the audio file
        path: String,
        /// Underlying failure
        message: String,
    },
    /// Audio format not supported
    #[display("Unsupported audio format: {}", _0)]
    UnsupportedFormat(String),
    /// Transcription service failure
    #[display("Transcription service error: {}", _0)]
    Service(String),
}

/// Error type for transcription operations.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Transcribe Error: {} at line {} in {}", kind, line, file)]
pub struct TranscribeError {
    /// The specific error condition
    pub kind: TranscribeErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl TranscribeError {
    /// Create a new TranscribeError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: TranscribeErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
