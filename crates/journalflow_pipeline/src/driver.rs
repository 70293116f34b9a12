//! The pipeline driver: polls entities by status and advances them.

use crate::ActionDispatcher;
use journalflow_core::{ActionContext, AudioMessage, STATUS_NEW, STATUS_TRANSCRIBED};
use journalflow_error::JournalflowResult;
use journalflow_interface::{ConfigStore, CycleReport, EntityStore, Transcriber, UsageLedger};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

/// Drives entities through the pipeline one status at a time.
///
/// Each cycle transcribes entities in status `new`, then resolves and
/// dispatches the configured process steps for every entity in an active
/// intermediate status, advancing status after each successful dispatch.
///
/// Processing is serialized: one entity at a time, one step at a time, so
/// status and version writes for an entity never race. A failed dispatch
/// leaves the entity's status unchanged; the next cycle retries it from the
/// same status. One entity's failure never halts the rest of the batch.
pub struct PipelineDriver<C, E, L> {
    config: Arc<C>,
    entities: Arc<E>,
    transcriber: Arc<dyn Transcriber>,
    dispatcher: ActionDispatcher<C, E, L>,
    entity_type: String,
}

impl<C, E, L> PipelineDriver<C, E, L>
where
    C: ConfigStore,
    E: EntityStore,
    L: UsageLedger,
{
    /// Create a driver for `entity_type` over the given collaborators.
    pub fn new(
        config: Arc<C>,
        entities: Arc<E>,
        transcriber: Arc<dyn Transcriber>,
        dispatcher: ActionDispatcher<C, E, L>,
        entity_type: impl Into<String>,
    ) -> Self {
        Self {
            config,
            entities,
            transcriber,
            dispatcher,
            entity_type: entity_type.into(),
        }
    }

    /// Run one poll cycle.
    ///
    /// # Errors
    ///
    /// Transcription failures and store fetch failures propagate; dispatch
    /// failures are contained per entity and reported in the cycle summary.
    #[tracing::instrument(skip(self), fields(entity_type = %self.entity_type))]
    pub async fn run_cycle(&self) -> JournalflowResult<CycleReport> {
        let mut report = CycleReport::default();

        self.transcribe_new(&mut report).await?;
        self.process_steps(&mut report).await?;

        tracing::info!(
            transcribed = report.transcribed(),
            advanced = report.advanced(),
            failed = report.failed(),
            skipped = report.skipped(),
            "Cycle finished"
        );

        Ok(report)
    }

    /// Stage 1: transcribe every entity in status `new`.
    async fn transcribe_new(&self, report: &mut CycleReport) -> JournalflowResult<()> {
        let pending = self.entities.by_status(STATUS_NEW).await?;
        tracing::debug!(count = pending.len(), "Fetched new entities");

        for message in pending {
            let text = self
                .transcriber
                .transcribe(Path::new(&message.filename))
                .await?;
            let word_count = text.split_whitespace().count() as i64;

            let transcribed = AudioMessage {
                transcription: Some(text),
                transcription_word_count: Some(word_count),
                status: STATUS_TRANSCRIBED.to_string(),
                ..message
            };
            self.entities.upsert(&transcribed).await?;

            tracing::info!(
                entity_id = transcribed.id,
                filename = %transcribed.filename,
                word_count,
                "Transcribed entity"
            );
            report.record_transcribed();
        }

        Ok(())
    }

    /// Stage 2: dispatch configured steps for every active intermediate
    /// status.
    async fn process_steps(&self, report: &mut CycleReport) -> JournalflowResult<()> {
        let statuses = self.config.active_statuses(&self.entity_type).await?;

        for status in statuses.iter().filter(|s| s.as_str() != STATUS_NEW) {
            let steps = self.config.process_steps(&self.entity_type, status).await?;
            if steps.is_empty() {
                // Absence of configuration is a valid no-op terminal state.
                for message in self.entities.by_status(status).await? {
                    tracing::debug!(
                        entity_id = message.id,
                        status = %status,
                        "No process steps configured, skipping entity"
                    );
                    report.record_skipped();
                }
                continue;
            }

            for message in self.entities.by_status(status).await? {
                for step in &steps {
                    let context = self.build_context(&message);
                    match self
                        .dispatcher
                        .execute(step.action_label(), context, &self.entity_type)
                        .await
                    {
                        Ok(_) => {
                            if let Err(e) = self
                                .entities
                                .update_status(message.id, step.next_status())
                                .await
                            {
                                tracing::error!(
                                    entity_id = message.id,
                                    next_status = %step.next_status(),
                                    error = %e,
                                    "Failed to advance status"
                                );
                                report.record_failed();
                                break;
                            }
                            tracing::info!(
                                entity_id = message.id,
                                action = %step.action_label(),
                                next_status = %step.next_status(),
                                "Entity advanced"
                            );
                            report.record_advanced();
                        }
                        Err(e) => {
                            // Status stays; the entity retries from here
                            // next cycle. Siblings keep processing.
                            tracing::error!(
                                entity_id = message.id,
                                action = %step.action_label(),
                                error = %e,
                                "Dispatch failed, leaving status unchanged"
                            );
                            report.record_failed();
                            break;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Seed the dispatch context from the entity record.
    fn build_context(&self, message: &AudioMessage) -> ActionContext {
        let mut context = ActionContext::new();
        context.insert("entity_id".to_string(), json!(message.id));
        context.insert("entity_type".to_string(), json!(self.entity_type));
        context.insert("filename".to_string(), json!(message.filename));
        context.insert("status".to_string(), json!(message.status));
        if let Some(transcription) = &message.transcription {
            context.insert("transcription".to_string(), json!(transcription));
        }
        if let Some(count) = message.transcription_word_count {
            context.insert("transcription_word_count".to_string(), json!(count));
        }
        if let Some(duration) = message.duration_seconds {
            context.insert("duration_seconds".to_string(), json!(duration));
        }
        if let Some(message_type) = &message.message_type {
            context.insert("message_type".to_string(), json!(message_type));
        }
        context
    }
}
