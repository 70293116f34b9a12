//! PostgreSQL implementation of the configuration store.

use crate::schema::{action_ai_llm, action_code, process_step, prompt, prompt_output,
    prompt_parameter};
use crate::rows::{AiLlmActionRow, CodeActionRow, ProcessStepRow, PromptOutputRow,
    PromptParameterRow, PromptRow};
use crate::{blocking, PgPool};
use async_trait::async_trait;
use diesel::prelude::*;
use journalflow_core::{AiLlmAction, CodeAction, OutputMapping, ProcessStep, PromptParameter,
    PromptTemplate};
use journalflow_error::JournalflowResult;
use journalflow_interface::ConfigStore;
use tracing::instrument;

/// Read-only configuration store over the `config` schema.
///
/// Every lookup runs on the blocking pool with a pooled connection.
#[derive(Clone)]
pub struct PostgresConfigStore {
    pool: PgPool,
}

impl PostgresConfigStore {
    /// Create a store over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConfigStore for PostgresConfigStore {
    #[instrument(skip(self))]
    async fn ai_action(&self, action_label: &str) -> JournalflowResult<Option<AiLlmAction>> {
        let label = action_label.to_string();
        blocking(&self.pool, move |conn| {
            let row = action_ai_llm::table
                .find(&label)
                .first::<AiLlmActionRow>(conn)
                .optional()
                .map_err(journalflow_error::DatabaseError::from)?;
            Ok(row.map(Into::into))
        })
        .await
    }

    #[instrument(skip(self))]
    async fn code_action(&self, action_label: &str) -> JournalflowResult<Option<CodeAction>> {
        let label = action_label.to_string();
        blocking(&self.pool, move |conn| {
            let row = action_code::table
                .find(&label)
                .first::<CodeActionRow>(conn)
                .optional()
                .map_err(journalflow_error::DatabaseError::from)?;
            Ok(row.map(CodeAction::try_from).transpose()?)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn prompt_template(
        &self,
        prompt_label: &str,
    ) -> JournalflowResult<Option<PromptTemplate>> {
        let label = prompt_label.to_string();
        blocking(&self.pool, move |conn| {
            let row = prompt::table
                .find(&label)
                .first::<PromptRow>(conn)
                .optional()
                .map_err(journalflow_error::DatabaseError::from)?;
            Ok(row.map(Into::into))
        })
        .await
    }

    #[instrument(skip(self))]
    async fn prompt_parameters(
        &self,
        prompt_label: &str,
    ) -> JournalflowResult<Vec<PromptParameter>> {
        let label = prompt_label.to_string();
        blocking(&self.pool, move |conn| {
            let rows = prompt_parameter::table
                .filter(prompt_parameter::prompt_label.eq(&label))
                .load::<PromptParameterRow>(conn)
                .map_err(journalflow_error::DatabaseError::from)?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn process_steps(
        &self,
        entity_type: &str,
        status: &str,
    ) -> JournalflowResult<Vec<ProcessStep>> {
        let entity_type = entity_type.to_string();
        let status = status.to_string();
        blocking(&self.pool, move |conn| {
            let rows = process_step::table
                .filter(process_step::entity_type.eq(&entity_type))
                .filter(process_step::current_status.eq(&status))
                .order(process_step::step_order.asc())
                .load::<ProcessStepRow>(conn)
                .map_err(journalflow_error::DatabaseError::from)?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn active_statuses(&self, entity_type: &str) -> JournalflowResult<Vec<String>> {
        let entity_type = entity_type.to_string();
        blocking(&self.pool, move |conn| {
            let statuses = process_step::table
                .filter(process_step::entity_type.eq(&entity_type))
                .select(process_step::current_status)
                .distinct()
                .load::<String>(conn)
                .map_err(journalflow_error::DatabaseError::from)?;
            Ok(statuses)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn output_mappings(&self, prompt_label: &str) -> JournalflowResult<Vec<OutputMapping>> {
        let label = prompt_label.to_string();
        blocking(&self.pool, move |conn| {
            let rows = prompt_output::table
                .filter(prompt_output::prompt_label.eq(&label))
                .load::<PromptOutputRow>(conn)
                .map_err(journalflow_error::DatabaseError::from)?;
            let mappings = rows
                .into_iter()
                .map(OutputMapping::try_from)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(mappings)
        })
        .await
    }
}
