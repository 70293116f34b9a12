//! Output application: merging parsed LLM responses onto entities.

use journalflow_core::{ColumnType, OutputMapping, VersionedEnvelope};
use journalflow_error::{JournalflowResult, PipelineError, PipelineErrorKind};
use journalflow_interface::{ConfigStore, EntityStore};
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Producer tag stamped on every envelope the applicator writes.
pub const PRODUCER_LLM: &str = "llm";

/// Applies parsed LLM output onto entity columns per the configured output
/// mappings.
///
/// Application is best-effort per output key: a key absent from the parsed
/// response is a warning and a skip, and one key's write failure is logged
/// and skipped without disturbing sibling keys. Each key's write is its own
/// transactional unit, so consistency is at-least-once per key rather than
/// all-or-nothing across keys.
pub struct OutputApplicator<C, E> {
    config: Arc<C>,
    entities: Arc<E>,
}

impl<C: ConfigStore, E: EntityStore> OutputApplicator<C, E> {
    /// Create an applicator over the given stores.
    pub fn new(config: Arc<C>, entities: Arc<E>) -> Self {
        Self { config, entities }
    }

    /// Apply every configured output mapping of `prompt_label` to the
    /// entity, reading values from `parsed`.
    ///
    /// Returns the number of keys written.
    ///
    /// # Errors
    ///
    /// Fails only on engine-level problems (the mapping lookup itself);
    /// individual key failures are logged and skipped.
    #[tracing::instrument(skip(self, parsed))]
    pub async fn apply(
        &self,
        prompt_label: &str,
        entity_id: i64,
        entity_type: &str,
        parsed: &JsonValue,
    ) -> JournalflowResult<usize> {
        let mappings = self.config.output_mappings(prompt_label).await?;
        let mut applied = 0;

        for mapping in &mappings {
            let key = mapping.output_key();

            let Some(value) = parsed.get(key) else {
                tracing::warn!(
                    prompt_label = %prompt_label,
                    output_key = %key,
                    "Output key absent from parsed response, skipping"
                );
                continue;
            };

            match self.apply_one(mapping, entity_id, value).await {
                Ok(()) => {
                    tracing::debug!(
                        output_key = %key,
                        target = %mapping.target(),
                        column = %mapping.column_name(),
                        "Applied output key"
                    );
                    applied += 1;
                }
                Err(e) => {
                    // One failing key never aborts its siblings.
                    tracing::error!(
                        output_key = %key,
                        entity_id,
                        error = %e,
                        "Failed to apply output key, continuing with remaining keys"
                    );
                }
            }
        }

        Ok(applied)
    }

    async fn apply_one(
        &self,
        mapping: &OutputMapping,
        entity_id: i64,
        value: &JsonValue,
    ) -> JournalflowResult<()> {
        match mapping.column_type() {
            ColumnType::Plain => {
                // Raw value, no envelope wrapping.
                self.entities
                    .update_column(mapping.target(), entity_id, mapping.column_name(), value)
                    .await
            }
            ColumnType::VersionedJson => {
                let json_key = mapping.json_key().as_deref().ok_or_else(|| {
                    PipelineError::new(PipelineErrorKind::MissingJsonKey(
                        mapping.output_key().clone(),
                    ))
                })?;

                let envelope = VersionedEnvelope::now(value.clone(), PRODUCER_LLM);
                self.entities
                    .update_versioned_json(
                        mapping.target(),
                        entity_id,
                        mapping.column_name(),
                        json_key,
                        envelope,
                        *mapping.mode(),
                    )
                    .await
            }
        }
    }
}
