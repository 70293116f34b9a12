//! Row types bridging diesel tables and core records.

use crate::schema::{audio_message, llm_usage};
use crate::DatabaseResult;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use journalflow_core::{
    AiLlmAction, AudioMessage, CodeAction, ColumnType, HandlerKey, OutputMapping, ProcessStep,
    PromptParameter, PromptTemplate, UsageRecord, VersionedDocument, WriteMode, WriteTarget,
};
use journalflow_error::{DatabaseError, DatabaseErrorKind};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

#[derive(Debug, Queryable)]
pub(crate) struct AiLlmActionRow {
    pub action_label: String,
    pub prompt_label: String,
    pub model_name: String,
    pub ai_provider: String,
}

impl From<AiLlmActionRow> for AiLlmAction {
    fn from(row: AiLlmActionRow) -> Self {
        AiLlmAction::new(
            row.action_label,
            row.prompt_label,
            row.model_name,
            row.ai_provider,
        )
    }
}

#[derive(Debug, Queryable)]
pub(crate) struct CodeActionRow {
    pub action_label: String,
    pub module_reference: String,
    pub entry_point: String,
    pub arguments: JsonValue,
}

impl TryFrom<CodeActionRow> for CodeAction {
    type Error = DatabaseError;

    fn try_from(row: CodeActionRow) -> DatabaseResult<Self> {
        let arguments: BTreeMap<String, JsonValue> = serde_json::from_value(row.arguments)?;
        Ok(CodeAction::new(
            row.action_label,
            HandlerKey::new(row.module_reference, row.entry_point),
            arguments,
        ))
    }
}

#[derive(Debug, Queryable)]
pub(crate) struct PromptRow {
    pub prompt_label: String,
    pub template: String,
    pub temperature: f32,
}

impl From<PromptRow> for PromptTemplate {
    fn from(row: PromptRow) -> Self {
        PromptTemplate::new(row.prompt_label, row.template, row.temperature)
    }
}

#[derive(Debug, Queryable)]
pub(crate) struct PromptParameterRow {
    pub id: i64,
    pub prompt_label: String,
    pub name: String,
    pub is_required: bool,
    pub default_value: Option<String>,
    pub max_length: Option<i32>,
}

impl From<PromptParameterRow> for PromptParameter {
    fn from(row: PromptParameterRow) -> Self {
        PromptParameter::new(
            row.prompt_label,
            row.name,
            row.is_required,
            row.default_value,
            row.max_length.map(|n| n.max(0) as usize),
        )
    }
}

#[derive(Debug, Queryable)]
pub(crate) struct ProcessStepRow {
    pub id: i64,
    pub entity_type: String,
    pub current_status: String,
    pub step_order: i32,
    pub action_label: String,
    pub next_status: String,
}

impl From<ProcessStepRow> for ProcessStep {
    fn from(row: ProcessStepRow) -> Self {
        ProcessStep::new(
            row.entity_type,
            row.current_status,
            row.step_order,
            row.action_label,
            row.next_status,
        )
    }
}

#[derive(Debug, Queryable)]
pub(crate) struct PromptOutputRow {
    pub id: i64,
    pub prompt_label: String,
    pub output_key: String,
    pub target_schema: String,
    pub target_table: String,
    pub id_column: String,
    pub column_name: String,
    pub column_type: String,
    pub json_key: Option<String>,
    pub mode: String,
}

impl TryFrom<PromptOutputRow> for OutputMapping {
    type Error = DatabaseError;

    fn try_from(row: PromptOutputRow) -> DatabaseResult<Self> {
        let column_type: ColumnType = row.column_type.parse().map_err(|_| {
            DatabaseError::new(DatabaseErrorKind::Serialization(format!(
                "Unknown column_type '{}'",
                row.column_type
            )))
        })?;
        let mode: WriteMode = row.mode.parse().map_err(|_| {
            DatabaseError::new(DatabaseErrorKind::Serialization(format!(
                "Unknown write mode '{}'",
                row.mode
            )))
        })?;
        Ok(OutputMapping::new(
            row.prompt_label,
            row.output_key,
            WriteTarget::new(row.target_schema, row.target_table, row.id_column),
            row.column_name,
            column_type,
            row.json_key,
            mode,
        ))
    }
}

#[derive(Debug, Queryable)]
pub(crate) struct AudioMessageRow {
    pub id: i64,
    pub filename: String,
    pub status: String,
    pub duration_seconds: Option<i64>,
    pub transcription: Option<String>,
    pub transcription_word_count: Option<i64>,
    pub message_type: Option<String>,
    pub metadata: JsonValue,
    pub enrichment: JsonValue,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<AudioMessageRow> for AudioMessage {
    type Error = DatabaseError;

    fn try_from(row: AudioMessageRow) -> DatabaseResult<Self> {
        let metadata: VersionedDocument = serde_json::from_value(row.metadata)?;
        let enrichment: VersionedDocument = serde_json::from_value(row.enrichment)?;
        Ok(AudioMessage {
            id: row.id,
            filename: row.filename,
            status: row.status,
            duration_seconds: row.duration_seconds,
            transcription: row.transcription,
            transcription_word_count: row.transcription_word_count,
            message_type: row.message_type,
            metadata,
            enrichment,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = audio_message)]
pub(crate) struct NewAudioMessageRow {
    pub id: i64,
    pub filename: String,
    pub status: String,
    pub duration_seconds: Option<i64>,
    pub transcription: Option<String>,
    pub transcription_word_count: Option<i64>,
    pub message_type: Option<String>,
    pub metadata: JsonValue,
    pub enrichment: JsonValue,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<&AudioMessage> for NewAudioMessageRow {
    type Error = DatabaseError;

    fn try_from(message: &AudioMessage) -> DatabaseResult<Self> {
        Ok(Self {
            id: message.id,
            filename: message.filename.clone(),
            status: message.status.clone(),
            duration_seconds: message.duration_seconds,
            transcription: message.transcription.clone(),
            transcription_word_count: message.transcription_word_count,
            message_type: message.message_type.clone(),
            metadata: serde_json::to_value(&message.metadata)?,
            enrichment: serde_json::to_value(&message.enrichment)?,
            created_at: message.created_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = llm_usage)]
pub(crate) struct NewLlmUsageRow {
    pub entity_type: String,
    pub entity_id: i64,
    pub model_name: String,
    pub prompt_label: String,
    pub prompt_text: String,
    pub response_text: Option<String>,
    pub prompt_token_count: i64,
    pub response_token_count: i64,
    pub response_duration_ms: i64,
    pub temperature: f32,
    pub status: String,
    pub error_message: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl From<&UsageRecord> for NewLlmUsageRow {
    fn from(record: &UsageRecord) -> Self {
        Self {
            entity_type: record.entity_type.clone(),
            entity_id: record.entity_id,
            model_name: record.model_name.clone(),
            prompt_label: record.prompt_label.clone(),
            prompt_text: record.prompt_text.clone(),
            response_text: record.response_text.clone(),
            prompt_token_count: record.prompt_token_count,
            response_token_count: record.response_token_count,
            response_duration_ms: record.response_duration_ms,
            temperature: record.temperature,
            status: record.status.to_string(),
            error_message: record.error_message.clone(),
            recorded_at: record.recorded_at,
        }
    }
}
