//! PostgreSQL connection setup and idempotent schema creation.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::error::StorageError;

/// Statements run on every connect. Each one is safe to repeat.
///
/// The partial unique index allows one live alias per (owner, url); anonymous
/// records share the empty-string owner scope.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS urls (
        id BIGSERIAL PRIMARY KEY,
        alias TEXT NOT NULL,
        url TEXT NOT NULL,
        user_id TEXT,
        deleted_flag BOOLEAN NOT NULL DEFAULT FALSE,
        CONSTRAINT urls_alias_key UNIQUE (alias)
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS urls_owner_url_live_key
        ON urls (COALESCE(user_id, ''), url)
        WHERE NOT deleted_flag
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS urls_user_id_idx ON urls (user_id)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        login VARCHAR(255) NOT NULL,
        password VARCHAR(255) NOT NULL,
        user_id VARCHAR(255) NOT NULL,
        CONSTRAINT users_login_key UNIQUE (login),
        CONSTRAINT users_user_id_key UNIQUE (user_id)
    )
    "#,
];

/// Connection pool settings, see [`crate::config::Config`].
#[derive(Debug, Clone, Copy)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

/// Opens a pool against `database_url` and creates the schema.
///
/// # Errors
///
/// Returns [`StorageError::Unavailable`] if the database cannot be reached.
pub async fn connect(database_url: &str, settings: PoolSettings) -> Result<PgPool, StorageError> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.connect_timeout)
        .idle_timeout(Some(settings.idle_timeout))
        .max_lifetime(Some(settings.max_lifetime))
        .connect(database_url)
        .await
        .map_err(|e| StorageError::unavailable(format!("failed to connect to database: {e}")))?;

    info!("Connected to database");

    init_schema(&pool).await?;
    Ok(pool)
}

/// Creates tables and indexes if they do not exist yet.
pub async fn init_schema(pool: &PgPool) -> Result<(), StorageError> {
    for &statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Database schema ready");
    Ok(())
}
