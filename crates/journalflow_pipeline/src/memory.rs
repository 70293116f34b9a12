//! In-memory store implementations.
//!
//! Used by the pipeline tests and local runs without a database. The
//! entity store models the same write surface the PostgreSQL store
//! exposes, including the versioned-merge semantics.

use async_trait::async_trait;
use journalflow_core::{
    AiLlmAction, AudioMessage, CodeAction, OutputMapping, ProcessStep, PromptParameter,
    PromptTemplate, UsageRecord, VersionedEnvelope, WriteMode, WriteTarget,
};
use journalflow_error::{JournalflowResult, PipelineError, PipelineErrorKind};
use journalflow_interface::{ConfigStore, EntityStore, UsageLedger};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::Mutex;

/// In-memory configuration store, populated fluently at construction.
///
/// # Examples
///
/// ```
/// use journalflow_core::{AiLlmAction, PromptTemplate};
/// use journalflow_pipeline::InMemoryConfigStore;
///
/// let config = InMemoryConfigStore::new()
///     .with_ai_action(AiLlmAction::new(
///         "classify".to_string(),
///         "classify_message".to_string(),
///         "gpt-4.1".to_string(),
///         "openai".to_string(),
///     ))
///     .with_template(PromptTemplate::new(
///         "classify_message".to_string(),
///         "Classify: {transcription}".to_string(),
///         0.0,
///     ));
/// ```
#[derive(Default)]
pub struct InMemoryConfigStore {
    ai_actions: HashMap<String, AiLlmAction>,
    code_actions: HashMap<String, CodeAction>,
    templates: HashMap<String, PromptTemplate>,
    parameters: HashMap<String, Vec<PromptParameter>>,
    steps: HashMap<(String, String), Vec<ProcessStep>>,
    mappings: HashMap<String, Vec<OutputMapping>>,
}

impl InMemoryConfigStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an ai_llm action definition.
    pub fn with_ai_action(mut self, action: AiLlmAction) -> Self {
        self.ai_actions.insert(action.action_label().clone(), action);
        self
    }

    /// Add a code action definition.
    pub fn with_code_action(mut self, action: CodeAction) -> Self {
        self.code_actions
            .insert(action.action_label().clone(), action);
        self
    }

    /// Add a prompt template.
    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.templates
            .insert(template.prompt_label().clone(), template);
        self
    }

    /// Add a prompt parameter.
    pub fn with_parameter(mut self, parameter: PromptParameter) -> Self {
        self.parameters
            .entry(parameter.prompt_label().clone())
            .or_default()
            .push(parameter);
        self
    }

    /// Add a process step, keeping steps ordered by `step_order`.
    pub fn with_step(mut self, step: ProcessStep) -> Self {
        let key = (step.entity_type().clone(), step.current_status().clone());
        let steps = self.steps.entry(key).or_default();
        steps.push(step);
        steps.sort_by_key(|s| *s.step_order());
        self
    }

    /// Add an output mapping.
    pub fn with_mapping(mut self, mapping: OutputMapping) -> Self {
        self.mappings
            .entry(mapping.prompt_label().clone())
            .or_default()
            .push(mapping);
        self
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn ai_action(&self, action_label: &str) -> JournalflowResult<Option<AiLlmAction>> {
        Ok(self.ai_actions.get(action_label).cloned())
    }

    async fn code_action(&self, action_label: &str) -> JournalflowResult<Option<CodeAction>> {
        Ok(self.code_actions.get(action_label).cloned())
    }

    async fn prompt_template(
        &self,
        prompt_label: &str,
    ) -> JournalflowResult<Option<PromptTemplate>> {
        Ok(self.templates.get(prompt_label).cloned())
    }

    async fn prompt_parameters(
        &self,
        prompt_label: &str,
    ) -> JournalflowResult<Vec<PromptParameter>> {
        Ok(self.parameters.get(prompt_label).cloned().unwrap_or_default())
    }

    async fn process_steps(
        &self,
        entity_type: &str,
        status: &str,
    ) -> JournalflowResult<Vec<ProcessStep>> {
        Ok(self
            .steps
            .get(&(entity_type.to_string(), status.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn active_statuses(&self, entity_type: &str) -> JournalflowResult<Vec<String>> {
        let mut statuses: Vec<String> = self
            .steps
            .iter()
            .filter(|((etype, _), steps)| etype == entity_type && !steps.is_empty())
            .map(|((_, status), _)| status.clone())
            .collect();
        statuses.sort();
        statuses.dedup();
        Ok(statuses)
    }

    async fn output_mappings(&self, prompt_label: &str) -> JournalflowResult<Vec<OutputMapping>> {
        Ok(self.mappings.get(prompt_label).cloned().unwrap_or_default())
    }
}

/// In-memory entity store keyed by message id.
#[derive(Default)]
pub struct InMemoryEntityStore {
    messages: Mutex<BTreeMap<i64, AudioMessage>>,
}

/// The entity table this store manages.
const ENTITY_TABLE: &str = "audio_message";

impl InMemoryEntityStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, as the ingestion collaborator would.
    pub async fn seed(&self, message: AudioMessage) {
        self.messages.lock().await.insert(message.id, message);
    }

    /// Fetch a record by id, for assertions.
    pub async fn get(&self, id: i64) -> Option<AudioMessage> {
        self.messages.lock().await.get(&id).cloned()
    }
}

#[async_trait]
impl EntityStore for InMemoryEntityStore {
    async fn by_status(&self, status: &str) -> JournalflowResult<Vec<AudioMessage>> {
        Ok(self
            .messages
            .lock()
            .await
            .values()
            .filter(|m| m.status == status)
            .cloned()
            .collect())
    }

    async fn upsert(&self, message: &AudioMessage) -> JournalflowResult<()> {
        self.messages
            .lock()
            .await
            .insert(message.id, message.clone());
        Ok(())
    }

    async fn update_status(&self, id: i64, status: &str) -> JournalflowResult<()> {
        let mut messages = self.messages.lock().await;
        let message = messages
            .get_mut(&id)
            .ok_or_else(|| PipelineError::new(PipelineErrorKind::EntityNotFound(id)))?;
        message.status = status.to_string();
        Ok(())
    }

    async fn update_column(
        &self,
        target: &WriteTarget,
        id_value: i64,
        column_name: &str,
        value: &JsonValue,
    ) -> JournalflowResult<()> {
        if target.table() != ENTITY_TABLE {
            return Err(PipelineError::new(PipelineErrorKind::UnknownWriteTarget(
                target.to_string(),
            ))
            .into());
        }

        let mut messages = self.messages.lock().await;
        let message = messages
            .get_mut(&id_value)
            .ok_or_else(|| PipelineError::new(PipelineErrorKind::EntityNotFound(id_value)))?;

        match column_name {
            "status" => message.status = as_text(value),
            "filename" => message.filename = as_text(value),
            "message_type" => message.message_type = Some(as_text(value)),
            "transcription" => message.transcription = Some(as_text(value)),
            "transcription_word_count" => {
                message.transcription_word_count = value.as_i64();
            }
            "duration_seconds" => message.duration_seconds = value.as_i64(),
            other => {
                return Err(PipelineError::new(PipelineErrorKind::UnknownColumn(
                    other.to_string(),
                ))
                .into());
            }
        }
        Ok(())
    }

    async fn update_versioned_json(
        &self,
        target: &WriteTarget,
        id_value: i64,
        json_column: &str,
        json_key: &str,
        envelope: VersionedEnvelope,
        mode: WriteMode,
    ) -> JournalflowResult<()> {
        if target.table() != ENTITY_TABLE {
            return Err(PipelineError::new(PipelineErrorKind::UnknownWriteTarget(
                target.to_string(),
            ))
            .into());
        }

        let mut messages = self.messages.lock().await;
        let message = messages
            .get_mut(&id_value)
            .ok_or_else(|| PipelineError::new(PipelineErrorKind::EntityNotFound(id_value)))?;

        let document = match json_column {
            "metadata" => &mut message.metadata,
            "enrichment" => &mut message.enrichment,
            other => {
                return Err(PipelineError::new(PipelineErrorKind::UnknownColumn(
                    other.to_string(),
                ))
                .into());
            }
        };
        document.apply(json_key, envelope, mode);
        Ok(())
    }
}

/// Stringify a JSON value for a text column: strings unquoted, everything
/// else in compact serialization.
fn as_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// In-memory append-only usage ledger.
#[derive(Default)]
pub struct InMemoryUsageLedger {
    records: Mutex<Vec<UsageRecord>>,
}

impl InMemoryUsageLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded entries, in insertion order.
    pub async fn records(&self) -> Vec<UsageRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl UsageLedger for InMemoryUsageLedger {
    async fn insert(&self, record: &UsageRecord) -> JournalflowResult<()> {
        self.records.lock().await.push(record.clone());
        Ok(())
    }
}
