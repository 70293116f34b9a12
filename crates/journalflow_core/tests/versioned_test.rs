//! Tests for versioned document merge semantics.

use journalflow_core::{VersionedDocument, VersionedEnvelope, WriteMode};
use serde_json::json;

#[test]
fn replace_is_idempotent_under_replay() {
    let mut doc = VersionedDocument::default();
    let envelope = VersionedEnvelope::now(json!("greeting"), "llm");

    doc.apply("category", envelope.clone(), WriteMode::Replace);
    doc.apply("category", envelope, WriteMode::Replace);

    assert_eq!(doc.history("category").len(), 1);
    let current = doc.current("category").unwrap();
    assert_eq!(current.value, json!("greeting"));
    assert_eq!(current.version, 1);
}

#[test]
fn replace_moves_current_and_keeps_history_below() {
    let mut doc = VersionedDocument::default();
    doc.apply(
        "topic",
        VersionedEnvelope::now(json!("sales"), "llm"),
        WriteMode::Add,
    );
    doc.apply(
        "topic",
        VersionedEnvelope::now(json!("marketing"), "llm"),
        WriteMode::Add,
    );
    doc.apply(
        "topic",
        VersionedEnvelope::now(json!("finance"), "llm"),
        WriteMode::Replace,
    );

    // Replace overwrote version 2; version 1 survives as history.
    let history = doc.history("topic");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].value, json!("sales"));
    assert_eq!(doc.current("topic").unwrap().value, json!("finance"));
    assert_eq!(doc.current("topic").unwrap().version, 2);
}

#[test]
fn add_appends_new_versions() {
    let mut doc = VersionedDocument::default();
    for i in 0..3 {
        doc.apply(
            "note",
            VersionedEnvelope::now(json!(format!("v{i}")), "llm"),
            WriteMode::Add,
        );
    }

    let history = doc.history("note");
    assert_eq!(history.len(), 3);
    assert_eq!(history[2].version, 3);
    assert_eq!(doc.current("note").unwrap().value, json!("v2"));
}

#[test]
fn missing_key_reads_as_empty() {
    let doc = VersionedDocument::default();
    assert!(doc.current("absent").is_none());
    assert!(doc.history("absent").is_empty());
    assert!(doc.is_empty());
}

#[test]
fn envelope_records_producer() {
    let mut doc = VersionedDocument::default();
    doc.apply(
        "summary",
        VersionedEnvelope::now(json!("quarterly recap"), "llm"),
        WriteMode::Replace,
    );
    assert_eq!(doc.current("summary").unwrap().producer, "llm");
}
