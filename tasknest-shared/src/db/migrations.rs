/// Schema migrations
///
/// The SQL files under `migrations/` (workspace root) are embedded into the
/// binary at compile time by `sqlx::migrate!` and applied in version order.
/// Applied versions are tracked in `_sqlx_migrations`, so running them on
/// every startup is safe.

use sqlx::{migrate::MigrateDatabase, postgres::PgPool, Postgres};
use tracing::{debug, error, info};

/// Applies every pending migration
///
/// # Errors
///
/// Returns the first failing migration; it is rolled back and later ones
/// are not attempted.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    let migrator = sqlx::migrate!("../migrations");
    info!(
        available = migrator.iter().count(),
        "Running database migrations"
    );

    migrator.run(pool).await.map_err(|e| {
        error!(error = %e, "Migration failed");
        e
    })?;

    info!("Database schema is up to date");
    Ok(())
}

/// Creates the target database when it is missing
///
/// Meant for local development; production databases are provisioned
/// separately.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if Postgres::database_exists(database_url).await? {
        debug!("Database already exists");
        return Ok(());
    }

    info!("Database does not exist, creating it");
    Postgres::create_database(database_url).await
}
