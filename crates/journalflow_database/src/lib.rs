//! PostgreSQL store implementations for JournalFlow.
//!
//! This crate provides diesel-backed implementations of the configuration
//! store, entity store, and usage ledger over the `config` and `data`
//! schemas, plus pool and migration utilities. All diesel calls run on the
//! blocking thread pool via `spawn_blocking`.
//!
//! # Example
//!
//! ```rust,ignore
//! use journalflow_database::{establish_pool, PostgresConfigStore, PostgresEntityStore};
//!
//! let pool = establish_pool()?;
//! let config = PostgresConfigStore::new(pool.clone());
//! let entities = PostgresEntityStore::new(pool);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config_store;
mod connection;
mod entity_store;
mod rows;
mod usage_ledger;

pub mod schema;

pub use config_store::PostgresConfigStore;
pub use connection::{establish_pool, run_migrations, PgPool};
pub use entity_store::PostgresEntityStore;
pub use usage_ledger::PostgresUsageLedger;

use diesel::pg::PgConnection;
use journalflow_error::{DatabaseError, DatabaseErrorKind, JournalflowResult};

/// Result type for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Run a diesel closure on the blocking pool with a pooled connection.
pub(crate) async fn blocking<T, F>(pool: &PgPool, f: F) -> JournalflowResult<T>
where
    T: Send + 'static,
    F: FnOnce(&mut PgConnection) -> JournalflowResult<T> + Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut conn = pool
            .get()
            .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))?;
        f(&mut conn)
    })
    .await
    .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(e.to_string())))?
}
