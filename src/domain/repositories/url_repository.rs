//! Storage facade for URL records.

use std::collections::HashMap;

use crate::domain::entities::{Alias, OriginalUrl};
use crate::error::StorageError;
use async_trait::async_trait;

/// The single storage interface every backend implements.
///
/// Identity is always an explicit argument: `owner` is `None` for anonymous
/// callers. Implementations must be safe to call concurrently from any task.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::MemoryUrlRepository`] - in-process only
/// - [`crate::infrastructure::persistence::FileUrlRepository`] - append-only JSON log
/// - [`crate::infrastructure::persistence::PgUrlRepository`] - PostgreSQL
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Short backend name used in logs and `Unsupported` errors.
    fn backend_name(&self) -> &'static str;

    /// Stores a batch of `alias → url` records owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Conflict`] if a URL in the batch already has a
    /// live alias for this owner, and [`StorageError::AliasTaken`] if an alias
    /// is used by a record the backend will not overwrite. In both cases no
    /// record of the batch is stored.
    ///
    /// A live alias is never moved to another owner: re-adding it under a
    /// different owner fails with `AliasTaken` on every backend. Within the
    /// same owner the memory and file backends overwrite it, while PostgreSQL
    /// rejects it with `AliasTaken`. An empty owner id is treated as
    /// anonymous.
    async fn add(
        &self,
        owner: Option<&str>,
        batch: HashMap<Alias, OriginalUrl>,
    ) -> Result<(), StorageError>;

    /// Resolves an alias.
    ///
    /// # Errors
    ///
    /// [`StorageError::NotFound`] for an unknown alias, [`StorageError::Deleted`]
    /// for a soft-deleted one.
    async fn get_url(&self, alias: &str) -> Result<OriginalUrl, StorageError>;

    /// Finds the live alias of `url` in the owner's scope.
    ///
    /// # Errors
    ///
    /// [`StorageError::NotFound`] if the URL has no live alias for `owner`.
    async fn get_alias(&self, owner: Option<&str>, url: &str) -> Result<Alias, StorageError>;

    /// Lists the live records owned by `user_id`.
    ///
    /// # Errors
    ///
    /// [`StorageError::Unsupported`] on backends without ownership.
    async fn get_user_urls(
        &self,
        user_id: &str,
    ) -> Result<HashMap<Alias, OriginalUrl>, StorageError>;

    /// Soft-deletes the listed aliases that belong to `user_id`.
    ///
    /// Aliases owned by someone else, unknown or already deleted are ignored,
    /// so applying the same call twice is harmless.
    ///
    /// # Errors
    ///
    /// [`StorageError::Unsupported`] on backends without ownership.
    async fn delete_user_urls(&self, user_id: &str, aliases: &[Alias])
    -> Result<(), StorageError>;

    /// Checks that the backend can serve requests.
    async fn ping(&self) -> Result<(), StorageError>;

    /// Releases the backend's resources. Safe to call more than once.
    async fn close(&self) -> Result<(), StorageError>;
}
