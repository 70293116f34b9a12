//! Configuration record types.
//!
//! These records are externally administered and read-only to the pipeline:
//! action definitions, prompt templates and parameters, process steps, and
//! output mappings. Together they define what each `(entity_type, status)`
//! pair does next.

use crate::WriteMode;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Default maximum substituted length for a prompt parameter value.
pub const DEFAULT_MAX_LENGTH: usize = 500;

/// An LLM-backed action: render a prompt and send it to a provider.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters, derive_new::new,
)]
pub struct AiLlmAction {
    /// Unique action label
    action_label: String,
    /// Prompt template to render
    prompt_label: String,
    /// Model identifier passed to the provider
    model_name: String,
    /// Provider key, e.g. `"openai"`
    ai_provider: String,
}

/// Registry key identifying a registered code-action handler.
///
/// The source system late-bound these via dynamic import; here the pair
/// resolves against a compile-time-registered handler table.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_new::new,
)]
#[display("{}::{}", module_reference, entry_point)]
pub struct HandlerKey {
    /// Module-level grouping of the handler
    pub module_reference: String,
    /// Handler name within the module
    pub entry_point: String,
}

/// A code action: invoke a registered handler with the context plus
/// declared keyword arguments.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters, derive_new::new,
)]
pub struct CodeAction {
    /// Unique action label
    action_label: String,
    /// Registered handler to invoke
    handler: HandlerKey,
    /// Keyword arguments passed alongside the context
    arguments: BTreeMap<String, JsonValue>,
}

/// A configured action, resolved once at lookup time into a closed sum.
///
/// An action label resolves to exactly one kind; when a label is configured
/// as both, ai_llm wins (first probe order).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionDefinition {
    /// Templated LLM call
    AiLlm(AiLlmAction),
    /// Registered code handler invocation
    Code(CodeAction),
}

impl ActionDefinition {
    /// The action label this definition is keyed by.
    pub fn action_label(&self) -> &str {
        match self {
            Self::AiLlm(action) => action.action_label(),
            Self::Code(action) => action.action_label(),
        }
    }
}

/// A prompt template with named `{placeholder}` substitution points.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters, derive_new::new,
)]
pub struct PromptTemplate {
    /// Unique prompt label
    prompt_label: String,
    /// Template text with named placeholders
    template: String,
    /// Sampling temperature for the provider call
    temperature: f32,
}

/// A declared parameter of a prompt template.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters, derive_new::new,
)]
pub struct PromptParameter {
    /// Prompt label this parameter belongs to
    prompt_label: String,
    /// Parameter name, matching a template placeholder
    name: String,
    /// Whether rendering fails when no value and no default exist
    is_required: bool,
    /// Fallback value when the caller supplies none
    default_value: Option<String>,
    /// Maximum substituted length in characters
    max_length: Option<usize>,
}

impl PromptParameter {
    /// The truncation limit for this parameter, defaulting to
    /// [`DEFAULT_MAX_LENGTH`].
    pub fn effective_max_length(&self) -> usize {
        self.max_length.unwrap_or(DEFAULT_MAX_LENGTH)
    }
}

/// One step of the process table: for an entity of `entity_type` in
/// `current_status`, run `action_label`, then advance to `next_status`.
///
/// Steps for a `(entity_type, current_status)` pair execute ordered by
/// `step_order`. Acyclicity of the step table is not enforced.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters, derive_new::new,
)]
pub struct ProcessStep {
    /// Entity type the step applies to
    entity_type: String,
    /// Status the entity must currently hold
    current_status: String,
    /// Execution order within the `(entity_type, current_status)` group
    step_order: i32,
    /// Action to dispatch
    action_label: String,
    /// Status to advance to after a successful dispatch
    next_status: String,
}

/// Destination column family for an output mapping.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ColumnType {
    /// Direct column update with the raw value
    #[display("plain")]
    Plain,
    /// Versioned-merge write into a JSON attribute container
    #[display("versioned_json")]
    VersionedJson,
}

/// Destination table addressed by an output mapping.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_getters::Getters,
    derive_new::new,
)]
#[display("{}.{}", schema, table)]
pub struct WriteTarget {
    /// Schema name
    schema: String,
    /// Table name
    table: String,
    /// Column identifying the entity row
    id_column: String,
}

/// Maps one key of a parsed LLM response onto an entity column.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters, derive_new::new,
)]
pub struct OutputMapping {
    /// Prompt label the mapping belongs to
    prompt_label: String,
    /// Key expected inside the parsed LLM JSON response
    output_key: String,
    /// Destination table
    target: WriteTarget,
    /// Destination column
    column_name: String,
    /// Plain column update or versioned JSON merge
    column_type: ColumnType,
    /// Attribute key inside the JSON container (required for versioned_json)
    json_key: Option<String>,
    /// Merge mode for versioned writes
    #[serde(default)]
    mode: WriteMode,
}
