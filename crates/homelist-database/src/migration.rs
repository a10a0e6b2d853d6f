//! Schema migration runner.

use sqlx::PgPool;
use tracing::info;

use homelist_core::error::{AppError, ErrorKind};

/// Apply every pending migration under `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    info!("Running store migrations");

    let migrator = sqlx::migrate!("../../migrations");
    migrator.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Failed to run migrations: {e}"),
            e,
        )
    })?;

    info!(
        applied = migrator.iter().count(),
        "Store migrations completed"
    );
    Ok(())
}
