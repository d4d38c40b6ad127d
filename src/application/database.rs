use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;

use crate::config::database::DatabaseConfig;
use crate::error::{AppError, Result};
use crate::migrations::Migrator;

pub type DbConn = DatabaseConnection;

/// Connect using the configured URL and bring the schema up to date
pub async fn connect(config: &DatabaseConfig) -> Result<DbConn> {
    connect_with_url(&config.database_url).await
}

/// Connect to `database_url` and run pending admin migrations
pub async fn connect_with_url(database_url: &str) -> Result<DbConn> {
    let in_memory = is_in_memory(database_url);
    tracing::info!(in_memory, "Opening admin database");

    let db = Database::connect(connect_options(database_url))
        .await
        .map_err(|e| AppError::Internal(format!("Failed to connect to database: {}", e)))?;

    Migrator::up(&db, None)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to run migrations: {}", e)))?;
    tracing::debug!("Admin schema is up to date");

    Ok(db)
}

/// Pool settings for a URL.
///
/// An in-memory SQLite database exists only inside the connection that
/// opened it, so those pools hold exactly one connection that never idles out.
pub fn connect_options(database_url: &str) -> ConnectOptions {
    let mut opts = ConnectOptions::new(database_url);
    opts.connect_timeout(Duration::from_secs(30))
        .sqlx_logging(false);

    if is_in_memory(database_url) {
        opts.max_connections(1).min_connections(1);
    } else {
        opts.max_connections(10)
            .min_connections(1)
            .idle_timeout(Duration::from_secs(600));
    }

    opts
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.starts_with("sqlite:")
        && (database_url.contains(":memory:") || database_url.contains("mode=memory"))
}
