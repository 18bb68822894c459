//! Storage backends and the facade that selects one of them.
//!
//! # Backends
//!
//! - [`MemoryUrlRepository`] / [`MemoryUserRepository`] - in-process maps
//! - [`FileUrlRepository`] / [`FileUserRepository`] - append-only JSON logs
//! - [`PgUrlRepository`] / [`PgUserRepository`] - PostgreSQL via SQLx
//!
//! The backend is picked once at startup by [`Storage::open`] and shared
//! through `Arc` for the rest of the process.

pub mod file_repository;
pub mod index;
pub mod json_log;
pub mod memory_repository;
pub mod pg_url_repository;
pub mod pg_user_repository;
pub mod schema;

pub use file_repository::{FileUrlRepository, FileUserRepository};
pub use index::BiIndex;
pub use memory_repository::{MemoryUrlRepository, MemoryUserRepository};
pub use pg_url_repository::PgUrlRepository;
pub use pg_user_repository::PgUserRepository;
pub use schema::PoolSettings;

use std::path::Path;
use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;

use crate::config::BackendKind;
use crate::domain::repositories::{UrlRepository, UserRepository};
use crate::error::StorageError;

/// The URL store and user sub-store of one backend.
#[derive(Clone)]
pub struct Storage {
    urls: Arc<dyn UrlRepository>,
    users: Arc<dyn UserRepository>,
}

impl Storage {
    /// Opens the backend described by `backend`.
    ///
    /// # Errors
    ///
    /// Fails if the database is unreachable or the log file cannot be read.
    pub async fn open(backend: &BackendKind, settings: PoolSettings) -> Result<Self, StorageError> {
        let storage = match backend {
            BackendKind::Postgres(dsn) => Self::postgres(dsn, settings).await?,
            BackendKind::File(path) => Self::file(path).await?,
            BackendKind::Memory => Self::memory(),
        };

        info!(backend = storage.backend_name(), "Storage opened");
        Ok(storage)
    }

    pub fn memory() -> Self {
        Self {
            urls: Arc::new(MemoryUrlRepository::new()),
            users: Arc::new(MemoryUserRepository::new()),
        }
    }

    pub async fn file(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let urls = FileUrlRepository::open(path).await?;
        let users = FileUserRepository::open(path).await?;

        Ok(Self {
            urls: Arc::new(urls),
            users: Arc::new(users),
        })
    }

    pub async fn postgres(dsn: &str, settings: PoolSettings) -> Result<Self, StorageError> {
        let pool = schema::connect(dsn, settings).await?;
        Ok(Self::from_pool(pool))
    }

    /// Wraps an existing pool. The schema must already exist.
    pub fn from_pool(pool: PgPool) -> Self {
        let pool = Arc::new(pool);
        Self {
            urls: Arc::new(PgUrlRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool)),
        }
    }

    pub fn urls(&self) -> Arc<dyn UrlRepository> {
        Arc::clone(&self.urls)
    }

    pub fn users(&self) -> Arc<dyn UserRepository> {
        Arc::clone(&self.users)
    }

    pub fn backend_name(&self) -> &'static str {
        self.urls.backend_name()
    }

    /// Closes both stores. Safe to call more than once.
    pub async fn close(&self) -> Result<(), StorageError> {
        let users = self.users.close().await;
        self.urls.close().await?;
        users?;

        info!(backend = self.backend_name(), "Storage closed");
        Ok(())
    }
}
