//! Application root: owns the storage facade and the delete pipeline.

use std::sync::Arc;

use tracing::info;

use crate::application::services::{LinkService, UserService};
use crate::config::Config;
use crate::domain::delete_worker::DeleteQueue;
use crate::domain::repositories::UserRepository;
use crate::error::StorageError;
use crate::infrastructure::persistence::Storage;

/// Everything a caller needs, built once at startup.
///
/// [`AppState::shutdown`] must run before the process exits so queued
/// deletes are applied and file logs are flushed.
#[derive(Clone)]
pub struct AppState {
    pub storage: Storage,
    pub delete_queue: Arc<DeleteQueue>,
    pub links: Arc<LinkService>,
}

impl AppState {
    /// Opens the configured backend and starts the delete pipeline.
    ///
    /// # Errors
    ///
    /// Fails if the backend cannot be opened.
    pub async fn build(config: &Config) -> Result<Self, StorageError> {
        let storage = Storage::open(&config.backend(), config.pool_settings()).await?;
        Ok(Self::with_storage(storage, config))
    }

    /// Wires services around an already opened backend.
    pub fn with_storage(storage: Storage, config: &Config) -> Self {
        let delete_queue = Arc::new(DeleteQueue::start(
            storage.urls(),
            config.delete_workers,
            config.delete_queue_capacity,
        ));

        let links = Arc::new(LinkService::new(
            storage.urls(),
            delete_queue.clone(),
            config.storage_timeout(),
            config.base_url.clone(),
        ));

        Self {
            storage,
            delete_queue,
            links,
        }
    }

    pub fn users(&self, password_secret: &str) -> UserService<dyn UserRepository> {
        UserService::new(self.storage.users(), password_secret)
    }

    /// Drains the delete pipeline, then closes the backend.
    pub async fn shutdown(&self) -> Result<(), StorageError> {
        self.delete_queue.stop().await;
        self.storage.close().await?;
        info!("Shutdown complete");
        Ok(())
    }
}
