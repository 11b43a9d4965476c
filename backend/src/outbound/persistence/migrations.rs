//! Embedded schema migrations.
//!
//! Migrations run over a synchronous Diesel connection on the blocking pool
//! because `diesel_migrations` drives a blocking `MigrationHarness`.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while applying migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// Could not open the migration connection.
    #[error("failed to connect for migrations: {0}")]
    Connect(#[from] diesel::ConnectionError),
    /// A migration failed to apply.
    #[error("failed to apply migrations: {0}")]
    Apply(String),
    /// The blocking task panicked or was cancelled.
    #[error("migration task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Apply every pending migration and return how many ran.
///
/// # Errors
/// Returns [`MigrationError`] when connecting or applying fails.
pub async fn run_pending_migrations(database_url: &str) -> Result<usize, MigrationError> {
    let database_url = database_url.to_owned();
    let applied = tokio::task::spawn_blocking(move || -> Result<usize, MigrationError> {
        let mut conn = PgConnection::establish(&database_url)?;
        let versions = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|err| MigrationError::Apply(err.to_string()))?;
        Ok(versions.len())
    })
    .await??;
    info!(applied, "database migrations applied");
    Ok(applied)
}
