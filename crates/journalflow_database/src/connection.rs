//! Database connection utilities.

use crate::DatabaseResult;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use journalflow_error::{DatabaseError, DatabaseErrorKind};

/// Shared r2d2 connection pool over PostgreSQL.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Build a connection pool from the `DATABASE_URL` environment variable.
///
/// # Errors
///
/// Returns an error if:
/// - `DATABASE_URL` environment variable is not set
/// - The pool cannot establish its initial connection
pub fn establish_pool() -> DatabaseResult<PgPool> {
    let database_url = std::env::var("DATABASE_URL").map_err(|_| {
        DatabaseError::new(DatabaseErrorKind::Connection(
            "DATABASE_URL environment variable not set".to_string(),
        ))
    })?;

    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder()
        .build(manager)
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))
}

/// Run pending migrations.
///
/// # Errors
///
/// Returns an error if any migration fails to apply.
pub fn run_migrations(conn: &mut PgConnection) -> DatabaseResult<()> {
    use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

    const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

    conn.run_pending_migrations(MIGRATIONS)
        .map(|_| ())
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Migration(e.to_string())))
}
