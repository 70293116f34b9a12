//! Trait definitions for pipeline collaborators.

use async_trait::async_trait;
use journalflow_core::{
    ActionContext, AiLlmAction, AudioMessage, ChatResponse, ChatSession, CodeAction,
    OutputMapping, ProcessStep, PromptParameter, PromptTemplate, UsageRecord, VersionedEnvelope,
    WriteMode, WriteTarget,
};
use journalflow_error::JournalflowResult;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::path::Path;

/// Read-only typed access to pipeline configuration.
///
/// Config records are externally administered; the core never writes them.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Look up an ai_llm action definition by label.
    async fn ai_action(&self, action_label: &str) -> JournalflowResult<Option<AiLlmAction>>;

    /// Look up a code action definition by label.
    async fn code_action(&self, action_label: &str) -> JournalflowResult<Option<CodeAction>>;

    /// Look up a prompt template by label.
    async fn prompt_template(&self, prompt_label: &str)
        -> JournalflowResult<Option<PromptTemplate>>;

    /// Declared parameters of a prompt.
    async fn prompt_parameters(
        &self,
        prompt_label: &str,
    ) -> JournalflowResult<Vec<PromptParameter>>;

    /// Ordered process steps for an entity type in a given status.
    ///
    /// An empty result is a valid no-op terminal condition, not an error.
    async fn process_steps(
        &self,
        entity_type: &str,
        status: &str,
    ) -> JournalflowResult<Vec<ProcessStep>>;

    /// Distinct statuses of an entity type that have configured steps.
    ///
    /// The driver polls these each cycle; statuses absent here are terminal.
    async fn active_statuses(&self, entity_type: &str) -> JournalflowResult<Vec<String>>;

    /// Output mappings declared for a prompt.
    async fn output_mappings(&self, prompt_label: &str)
        -> JournalflowResult<Vec<OutputMapping>>;
}

/// Read/write access to entity records.
///
/// Every method is one transactional unit: it commits on success and rolls
/// back on failure. Calls are not atomic with one another.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Fetch all entities currently in `status`. No ordering guarantee.
    async fn by_status(&self, status: &str) -> JournalflowResult<Vec<AudioMessage>>;

    /// Insert or update an entity record keyed by id.
    async fn upsert(&self, message: &AudioMessage) -> JournalflowResult<()>;

    /// Advance an entity's status.
    async fn update_status(&self, id: i64, status: &str) -> JournalflowResult<()>;

    /// Direct column update with a raw value (no envelope).
    async fn update_column(
        &self,
        target: &WriteTarget,
        id_value: i64,
        column_name: &str,
        value: &JsonValue,
    ) -> JournalflowResult<()>;

    /// Versioned-merge write into a JSON attribute container.
    async fn update_versioned_json(
        &self,
        target: &WriteTarget,
        id_value: i64,
        json_column: &str,
        json_key: &str,
        envelope: VersionedEnvelope,
        mode: WriteMode,
    ) -> JournalflowResult<()>;
}

/// Append-only audit trail of LLM invocations.
#[async_trait]
pub trait UsageLedger: Send + Sync {
    /// Append one usage record in its own transaction.
    ///
    /// A failure here propagates: usage records are never lost silently.
    async fn insert(&self, record: &UsageRecord) -> JournalflowResult<()>;
}

/// Uniform request/response contract over an LLM provider.
#[async_trait]
pub trait ChatDriver: Send + Sync + std::fmt::Debug {
    /// Send the session to the provider and append the assistant's reply.
    async fn chat(
        &self,
        session: &mut ChatSession,
        model: &str,
        temperature: f32,
    ) -> JournalflowResult<ChatResponse>;

    /// Provider key, e.g. `"openai"`.
    fn provider_name(&self) -> &'static str;
}

/// Speech-to-text collaborator.
#[async_trait]
pub trait Transcriber: Send + Sync + std::fmt::Debug {
    /// Transcribe the audio file at `path` to plain text.
    async fn transcribe(&self, path: &Path) -> JournalflowResult<String>;
}

/// A registered code-action handler.
///
/// Handlers receive the dispatch context plus the action's declared keyword
/// arguments and return the (possibly mutated) context. Handler failures
/// propagate unrecorded; code actions are not LLM calls and leave no usage
/// ledger entry.
#[async_trait]
pub trait CodeActionHandler: Send + Sync {
    /// Invoke the handler.
    async fn call(
        &self,
        context: ActionContext,
        arguments: &BTreeMap<String, JsonValue>,
    ) -> JournalflowResult<ActionContext>;
}
