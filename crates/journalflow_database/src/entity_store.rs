//! PostgreSQL implementation of the entity store.

use crate::rows::{AudioMessageRow, NewAudioMessageRow};
use crate::schema::audio_message;
use crate::{blocking, PgPool};
use async_trait::async_trait;
use diesel::prelude::*;
use journalflow_core::{AudioMessage, VersionedDocument, VersionedEnvelope, WriteMode,
    WriteTarget};
use journalflow_error::{DatabaseError, DatabaseErrorKind, JournalflowResult, PipelineError,
    PipelineErrorKind};
use journalflow_interface::EntityStore;
use serde_json::Value as JsonValue;
use tracing::instrument;

/// The only write target this store manages.
const TARGET_SCHEMA: &str = "data";
const TARGET_TABLE: &str = "audio_message";

#[derive(Clone, Copy)]
enum JsonColumn {
    Metadata,
    Enrichment,
}

/// Entity store over `data.audio_message`.
///
/// Each method is one transactional unit; versioned writes read, merge, and
/// write the JSON container inside a single transaction.
#[derive(Clone)]
pub struct PostgresEntityStore {
    pool: PgPool,
}

impl PostgresEntityStore {
    /// Create a store over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn check_target(target: &WriteTarget) -> JournalflowResult<()> {
    if target.schema() != TARGET_SCHEMA || target.table() != TARGET_TABLE {
        return Err(DatabaseError::new(DatabaseErrorKind::UnknownTarget(
            target.schema().clone(),
            target.table().clone(),
        ))
        .into());
    }
    Ok(())
}

/// Stringify a JSON value for a text column: strings unquoted, everything
/// else in compact serialization.
fn as_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl EntityStore for PostgresEntityStore {
    #[instrument(skip(self))]
    async fn by_status(&self, status: &str) -> JournalflowResult<Vec<AudioMessage>> {
        let status = status.to_string();
        blocking(&self.pool, move |conn| {
            let rows = audio_message::table
                .filter(audio_message::status.eq(&status))
                .load::<AudioMessageRow>(conn)
                .map_err(DatabaseError::from)?;
            let messages = rows
                .into_iter()
                .map(AudioMessage::try_from)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(messages)
        })
        .await
    }

    #[instrument(skip(self, message), fields(entity_id = message.id))]
    async fn upsert(&self, message: &AudioMessage) -> JournalflowResult<()> {
        let row = NewAudioMessageRow::try_from(message)?;
        blocking(&self.pool, move |conn| {
            diesel::insert_into(audio_message::table)
                .values(&row)
                .on_conflict(audio_message::id)
                .do_update()
                .set(&row)
                .execute(conn)
                .map_err(DatabaseError::from)?;
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn update_status(&self, id: i64, status: &str) -> JournalflowResult<()> {
        let status = status.to_string();
        blocking(&self.pool, move |conn| {
            let updated = diesel::update(audio_message::table.find(id))
                .set(audio_message::status.eq(&status))
                .execute(conn)
                .map_err(DatabaseError::from)?;
            if updated == 0 {
                return Err(PipelineError::new(PipelineErrorKind::EntityNotFound(id)).into());
            }
            Ok(())
        })
        .await
    }

    #[instrument(skip(self, value))]
    async fn update_column(
        &self,
        target: &WriteTarget,
        id_value: i64,
        column_name: &str,
        value: &JsonValue,
    ) -> JournalflowResult<()> {
        check_target(target)?;
        let column_name = column_name.to_string();
        let value = value.clone();

        blocking(&self.pool, move |conn| {
            let query = diesel::update(audio_message::table.find(id_value));
            let updated = match column_name.as_str() {
                "status" => query
                    .set(audio_message::status.eq(as_text(&value)))
                    .execute(conn),
                "filename" => query
                    .set(audio_message::filename.eq(as_text(&value)))
                    .execute(conn),
                "message_type" => query
                    .set(audio_message::message_type.eq(Some(as_text(&value))))
                    .execute(conn),
                "transcription" => query
                    .set(audio_message::transcription.eq(Some(as_text(&value))))
                    .execute(conn),
                "transcription_word_count" => query
                    .set(audio_message::transcription_word_count.eq(value.as_i64()))
                    .execute(conn),
                "duration_seconds" => query
                    .set(audio_message::duration_seconds.eq(value.as_i64()))
                    .execute(conn),
                other => {
                    return Err(PipelineError::new(PipelineErrorKind::UnknownColumn(
                        other.to_string(),
                    ))
                    .into());
                }
            }
            .map_err(DatabaseError::from)?;

            if updated == 0 {
                return Err(PipelineError::new(PipelineErrorKind::EntityNotFound(id_value)).into());
            }
            Ok(())
        })
        .await
    }

    #[instrument(skip(self, envelope))]
    async fn update_versioned_json(
        &self,
        target: &WriteTarget,
        id_value: i64,
        json_column: &str,
        json_key: &str,
        envelope: VersionedEnvelope,
        mode: WriteMode,
    ) -> JournalflowResult<()> {
        check_target(target)?;
        let column = match json_column {
            "metadata" => JsonColumn::Metadata,
            "enrichment" => JsonColumn::Enrichment,
            other => {
                return Err(PipelineError::new(PipelineErrorKind::UnknownColumn(
                    other.to_string(),
                ))
                .into());
            }
        };
        let json_key = json_key.to_string();

        blocking(&self.pool, move |conn| {
            // Read-merge-write under one transaction so concurrent writers
            // cannot interleave versions.
            let result = conn.transaction::<_, DatabaseError, _>(|conn| {
                let raw: JsonValue = match column {
                    JsonColumn::Metadata => audio_message::table
                        .find(id_value)
                        .select(audio_message::metadata)
                        .first(conn),
                    JsonColumn::Enrichment => audio_message::table
                        .find(id_value)
                        .select(audio_message::enrichment)
                        .first(conn),
                }?;

                let mut document: VersionedDocument = serde_json::from_value(raw)?;
                document.apply(&json_key, envelope, mode);
                let merged = serde_json::to_value(&document)?;

                let query = diesel::update(audio_message::table.find(id_value));
                match column {
                    JsonColumn::Metadata => {
                        query.set(audio_message::metadata.eq(merged)).execute(conn)
                    }
                    JsonColumn::Enrichment => {
                        query.set(audio_message::enrichment.eq(merged)).execute(conn)
                    }
                }?;

                Ok(())
            });
            result.map_err(|e| {
                if matches!(e.kind, DatabaseErrorKind::NotFound) {
                    PipelineError::new(PipelineErrorKind::EntityNotFound(id_value)).into()
                } else {
                    e.into()
                }
            })
        })
        .await
    }
}
