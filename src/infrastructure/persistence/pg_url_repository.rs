//! PostgreSQL implementation of the URL storage facade.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

use crate::domain::entities::{Alias, OriginalUrl};
use crate::domain::repositories::UrlRepository;
use crate::error::StorageError;

/// Rows per `add` call; three bind parameters each must stay under the
/// protocol limit of 65535.
pub const MAX_BATCH_ROWS: usize = 20_000;

/// PostgreSQL repository for URL records.
///
/// `add` issues a single multi-row INSERT, so a batch is stored entirely or
/// not at all.
pub struct PgUrlRepository {
    pool: Arc<PgPool>,
}

impl PgUrlRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UrlRepository for PgUrlRepository {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn add(
        &self,
        owner: Option<&str>,
        batch: HashMap<Alias, OriginalUrl>,
    ) -> Result<(), StorageError> {
        if batch.is_empty() {
            return Ok(());
        }
        if batch.len() > MAX_BATCH_ROWS {
            return Err(StorageError::Validation(format!(
                "batch of {} records exceeds the limit of {}",
                batch.len(),
                MAX_BATCH_ROWS
            )));
        }

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO urls (alias, url, user_id) ");
        builder.push_values(batch.iter(), |mut row, (alias, url)| {
            row.push_bind(alias).push_bind(url).push_bind(owner);
        });

        builder.build().execute(self.pool.as_ref()).await?;

        Ok(())
    }

    async fn get_url(&self, alias: &str) -> Result<OriginalUrl, StorageError> {
        let row: Option<(String, bool)> =
            sqlx::query_as("SELECT url, deleted_flag FROM urls WHERE alias = $1")
                .bind(alias)
                .fetch_optional(self.pool.as_ref())
                .await?;

        match row {
            Some((_, true)) => Err(StorageError::Deleted(alias.to_string())),
            Some((url, false)) => Ok(url),
            None => Err(StorageError::not_found(format!("alias '{alias}'"))),
        }
    }

    async fn get_alias(&self, owner: Option<&str>, url: &str) -> Result<Alias, StorageError> {
        let alias: Option<String> = sqlx::query_scalar(
            r#"
            SELECT alias
            FROM urls
            WHERE url = $1
              AND COALESCE(user_id, '') = COALESCE($2, '')
              AND NOT deleted_flag
            "#,
        )
        .bind(url)
        .bind(owner)
        .fetch_optional(self.pool.as_ref())
        .await?;

        alias.ok_or_else(|| StorageError::not_found(format!("alias for url '{url}'")))
    }

    async fn get_user_urls(
        &self,
        user_id: &str,
    ) -> Result<HashMap<Alias, OriginalUrl>, StorageError> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT alias, url FROM urls WHERE user_id = $1 AND NOT deleted_flag",
        )
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().collect())
    }

    async fn delete_user_urls(
        &self,
        user_id: &str,
        aliases: &[Alias],
    ) -> Result<(), StorageError> {
        if aliases.is_empty() {
            return Ok(());
        }

        let result = sqlx::query(
            r#"
            UPDATE urls
            SET deleted_flag = TRUE
            WHERE user_id = $1 AND alias = ANY($2) AND NOT deleted_flag
            "#,
        )
        .bind(user_id)
        .bind(aliases)
        .execute(self.pool.as_ref())
        .await?;

        debug!(
            user_id,
            requested = aliases.len(),
            changed = result.rows_affected(),
            "Soft-deleted aliases"
        );

        Ok(())
    }

    async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .map(|_| ())
            .map_err(|e| StorageError::unavailable(format!("database ping failed: {e}")))
    }

    async fn close(&self) -> Result<(), StorageError> {
        if !self.pool.is_closed() {
            self.pool.close().await;
            debug!("Database pool closed");
        }
        Ok(())
    }
}
