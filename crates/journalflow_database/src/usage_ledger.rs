//! PostgreSQL implementation of the usage ledger.

use crate::rows::NewLlmUsageRow;
use crate::schema::llm_usage;
use crate::{blocking, PgPool};
use async_trait::async_trait;
use diesel::prelude::*;
use journalflow_core::UsageRecord;
use journalflow_error::{DatabaseError, JournalflowResult};
use journalflow_interface::UsageLedger;
use tracing::instrument;

/// Append-only ledger over `data.llm_usage`.
#[derive(Clone)]
pub struct PostgresUsageLedger {
    pool: PgPool,
}

impl PostgresUsageLedger {
    /// Create a ledger over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsageLedger for PostgresUsageLedger {
    #[instrument(skip(self, record), fields(entity_id = record.entity_id, status = %record.status))]
    async fn insert(&self, record: &UsageRecord) -> JournalflowResult<()> {
        let row = NewLlmUsageRow::from(record);
        blocking(&self.pool, move |conn| {
            diesel::insert_into(llm_usage::table)
                .values(&row)
                .execute(conn)
                .map_err(DatabaseError::from)?;
            Ok(())
        })
        .await
    }
}
