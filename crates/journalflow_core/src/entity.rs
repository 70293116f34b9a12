//! The audio-message entity record.

use crate::VersionedDocument;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a freshly ingested, untranscribed message.
pub const STATUS_NEW: &str = "new";
/// Status after transcription succeeds.
pub const STATUS_TRANSCRIBED: &str = "transcribed";
/// Terminal status once every configured step has run.
pub const STATUS_COMPLETE: &str = "complete";

/// An audio message flowing through the pipeline.
///
/// Records are created by the ingestion collaborator, mutated exclusively by
/// the pipeline driver and output applicator, and never deleted here. The
/// status set is extensible: anything the process-step table names is a
/// valid intermediate status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioMessage {
    /// Store-owned identifier
    pub id: i64,
    /// Source audio file name
    pub filename: String,
    /// Pipeline status
    pub status: String,
    /// Recording length, when known
    pub duration_seconds: Option<i64>,
    /// Transcribed text, populated by the transcription stage
    pub transcription: Option<String>,
    /// Whitespace word count of the transcription
    pub transcription_word_count: Option<i64>,
    /// Classification produced by the pipeline
    pub message_type: Option<String>,
    /// Versioned metadata attributes
    #[serde(default)]
    pub metadata: VersionedDocument,
    /// Versioned enrichment attributes
    #[serde(default)]
    pub enrichment: VersionedDocument,
    /// Ingestion timestamp
    pub created_at: DateTime<Utc>,
}

impl AudioMessage {
    /// Create a fresh message in status `new`, as the ingestion
    /// collaborator would.
    pub fn ingested(id: i64, filename: impl Into<String>) -> Self {
        Self {
            id,
            filename: filename.into(),
            status: STATUS_NEW.to_string(),
            duration_seconds: None,
            transcription: None,
            transcription_word_count: None,
            message_type: None,
            metadata: VersionedDocument::default(),
            enrichment: VersionedDocument::default(),
            created_at: Utc::now(),
        }
    }
}
