//! Action execution context.

use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// The mutable key/value context threaded through a dispatch.
///
/// The driver seeds it from the entity record (`entity_id`, `entity_type`,
/// `transcription`, ...); the renderer reads it as the parameter source;
/// code actions may extend it.
pub type ActionContext = HashMap<String, JsonValue>;
