//! PostgreSQL implementation of the user sub-store.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewUser, User};
use crate::domain::repositories::UserRepository;
use crate::error::StorageError;

/// PostgreSQL repository for the `users` table.
pub struct PgUserRepository {
    pool: Arc<PgPool>,
}

impl PgUserRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create_user(&self, new_user: NewUser) -> Result<User, StorageError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (login, password, user_id) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&new_user.login)
        .bind(&new_user.password_hash)
        .bind(&new_user.user_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(new_user.into_user(id))
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, StorageError> {
        let row: Option<(i64, String, String, String)> = sqlx::query_as(
            "SELECT id, login, password, user_id FROM users WHERE login = $1",
        )
        .bind(login)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(|(id, login, password, user_id)| User {
            id,
            login,
            password,
            user_id,
        }))
    }
}
