//! Versioned JSON attribute containers.
//!
//! Entity records carry JSON attribute containers (`metadata`, `enrichment`)
//! whose values are versioned: every write is wrapped in an envelope
//! recording the value, the producer, and the write timestamp. Each
//! attribute key holds an ordered history of entries; the entry with the
//! highest version is the current value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Merge mode for versioned writes.
///
/// `Replace` supersedes the current entry under a key; `Add` appends a new
/// version alongside it.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WriteMode {
    /// Append a new version under the key, keeping all existing entries
    #[display("add")]
    Add,
    /// Overwrite the current (highest-version) entry under the key
    #[default]
    #[display("replace")]
    Replace,
}

/// Provenance wrapper for a written field: the value, who produced it,
/// and when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionedEnvelope {
    /// The raw value being written
    pub value: JsonValue,
    /// Producer tag, e.g. `"llm"`
    pub producer: String,
    /// Write timestamp
    pub timestamp: DateTime<Utc>,
}

impl VersionedEnvelope {
    /// Create an envelope stamped with the current time.
    pub fn now(value: JsonValue, producer: impl Into<String>) -> Self {
        Self {
            value,
            producer: producer.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A single versioned entry under an attribute key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionedEntry {
    /// Version counter, 1-based, ascending
    pub version: u32,
    /// The raw value
    pub value: JsonValue,
    /// Producer tag
    pub producer: String,
    /// Write timestamp
    pub timestamp: DateTime<Utc>,
}

/// An ordered set of versioned entries keyed by attribute name.
///
/// Entries under a key are kept sorted ascending by version; the last
/// entry is the current value.
///
/// # Examples
///
/// ```
/// use journalflow_core::{VersionedDocument, VersionedEnvelope, WriteMode};
/// use serde_json::json;
///
/// let mut doc = VersionedDocument::default();
/// doc.apply("topic", VersionedEnvelope::now(json!("sales"), "llm"), WriteMode::Replace);
/// doc.apply("topic", VersionedEnvelope::now(json!("marketing"), "llm"), WriteMode::Replace);
///
/// let current = doc.current("topic").unwrap();
/// assert_eq!(current.value, json!("marketing"));
/// assert_eq!(doc.history("topic").len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionedDocument(BTreeMap<String, Vec<VersionedEntry>>);

impl VersionedDocument {
    /// Apply an envelope under `key` with the given merge mode.
    ///
    /// `Replace` overwrites the highest-version entry in place (inserting
    /// at version 1 when the key is absent); lower versions are retained
    /// as history. `Add` appends a new entry at `highest + 1`.
    pub fn apply(&mut self, key: impl Into<String>, envelope: VersionedEnvelope, mode: WriteMode) {
        let entries = self.0.entry(key.into()).or_default();
        let next_version = entries.last().map(|e| e.version + 1).unwrap_or(1);

        let entry = |version: u32| VersionedEntry {
            version,
            value: envelope.value.clone(),
            producer: envelope.producer.clone(),
            timestamp: envelope.timestamp,
        };

        match mode {
            WriteMode::Add => entries.push(entry(next_version)),
            WriteMode::Replace => match entries.last_mut() {
                Some(last) => *last = entry(last.version),
                None => entries.push(entry(1)),
            },
        }
    }

    /// The current (highest-version) entry under `key`.
    pub fn current(&self, key: &str) -> Option<&VersionedEntry> {
        self.0.get(key).and_then(|entries| entries.last())
    }

    /// The full version history under `key`, ascending by version.
    pub fn history(&self, key: &str) -> &[VersionedEntry] {
        self.0.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All attribute keys present in the document.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// True when no key holds any entry.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }
}
