//! Link shortening, resolution and deletion service.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::domain::delete_worker::DeleteQueue;
use crate::domain::entities::{Alias, OriginalUrl};
use crate::domain::repositories::UrlRepository;
use crate::error::StorageError;
use crate::utils::alias_generator::generate_alias;
use crate::utils::url_validator::validate_url;

/// Attempts at finding an alias that does not resolve yet.
pub const MAX_ALIAS_ATTEMPTS: usize = 10;

/// Result of a single shorten call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortenOutcome {
    pub alias: Alias,
    /// `false` when the URL already had an alias in the caller's scope.
    pub created: bool,
}

/// One entry of a batch shorten request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub correlation_id: String,
    pub original_url: OriginalUrl,
}

/// One entry of a batch shorten response, in request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    pub correlation_id: String,
    pub alias: Alias,
}

/// Creates, resolves and deletes short links on top of the storage facade.
///
/// De-duplication is scoped per owner; anonymous callers share one scope.
/// Deletes are handed to the [`DeleteQueue`] and applied in the background.
/// Every storage call is bounded by `op_timeout`.
pub struct LinkService {
    repository: Arc<dyn UrlRepository>,
    delete_queue: Arc<DeleteQueue>,
    op_timeout: Duration,
    base_url: String,
}

impl LinkService {
    pub fn new(
        repository: Arc<dyn UrlRepository>,
        delete_queue: Arc<DeleteQueue>,
        op_timeout: Duration,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            delete_queue,
            op_timeout,
            base_url: base_url.into(),
        }
    }

    /// Shortens `url` for `owner`.
    ///
    /// Returns the existing alias with `created: false` if the URL was
    /// already shortened in this scope, including when a concurrent call
    /// won the race to insert it.
    ///
    /// # Errors
    ///
    /// - [`StorageError::Validation`] for a URL that is not absolute http(s)
    /// - [`StorageError::AliasSpaceExhausted`] if no free alias was found
    /// - [`StorageError::Timeout`] if a storage call exceeds the deadline
    pub async fn shorten(
        &self,
        owner: Option<&str>,
        url: &str,
    ) -> Result<ShortenOutcome, StorageError> {
        validate_url(url).map_err(|e| StorageError::Validation(e.to_string()))?;

        if let Some(alias) = self.existing_alias(owner, url).await? {
            return Ok(ShortenOutcome {
                alias,
                created: false,
            });
        }

        let alias = self.free_alias(&HashSet::new()).await?;
        let batch = HashMap::from([(alias.clone(), url.to_string())]);

        match self.deadline(self.repository.add(owner, batch)).await {
            Ok(()) => {
                info!(alias = %alias, owner = ?owner, "Short link created");
                Ok(ShortenOutcome {
                    alias,
                    created: true,
                })
            }
            Err(StorageError::Conflict { alias: existing }) => {
                let alias = match existing {
                    Some(alias) => alias,
                    None => self.deadline(self.repository.get_alias(owner, url)).await?,
                };
                debug!(alias = %alias, "Lost shorten race, reusing existing alias");
                Ok(ShortenOutcome {
                    alias,
                    created: false,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Shortens several URLs at once.
    ///
    /// URLs that already have an alias reuse it; the rest are stored with a
    /// single `add`. Repeated URLs within the batch share one alias.
    ///
    /// # Errors
    ///
    /// Fails before touching storage if any URL is invalid.
    pub async fn shorten_batch(
        &self,
        owner: Option<&str>,
        items: Vec<BatchItem>,
    ) -> Result<Vec<BatchResult>, StorageError> {
        for item in &items {
            validate_url(&item.original_url).map_err(|e| {
                StorageError::Validation(format!("{}: {}", item.correlation_id, e))
            })?;
        }

        let mut aliases: HashMap<OriginalUrl, Alias> = HashMap::new();
        let mut fresh: HashMap<Alias, OriginalUrl> = HashMap::new();
        let mut reserved: HashSet<Alias> = HashSet::new();

        for item in &items {
            if aliases.contains_key(&item.original_url) {
                continue;
            }
            let alias = match self.existing_alias(owner, &item.original_url).await? {
                Some(alias) => alias,
                None => {
                    let alias = self.free_alias(&reserved).await?;
                    reserved.insert(alias.clone());
                    fresh.insert(alias.clone(), item.original_url.clone());
                    alias
                }
            };
            aliases.insert(item.original_url.clone(), alias);
        }

        if !fresh.is_empty() {
            let count = fresh.len();
            match self.deadline(self.repository.add(owner, fresh.clone())).await {
                Ok(()) => info!(count, owner = ?owner, "Batch of short links created"),
                Err(StorageError::Conflict { .. }) => {
                    // Another caller stored some of these URLs first.
                    debug!(count, "Batch conflicted, shortening one by one");
                    for url in fresh.into_values() {
                        let outcome = self.shorten(owner, &url).await?;
                        aliases.insert(url, outcome.alias);
                    }
                }
                Err(e) => return Err(e),
            }
        }

        items
            .into_iter()
            .map(|item| {
                let alias = aliases.get(&item.original_url).cloned().ok_or_else(|| {
                    StorageError::not_found(format!("alias for {}", item.correlation_id))
                })?;
                Ok(BatchResult {
                    correlation_id: item.correlation_id,
                    alias,
                })
            })
            .collect()
    }

    /// Resolves an alias to its original URL.
    ///
    /// # Errors
    ///
    /// [`StorageError::NotFound`] or [`StorageError::Deleted`].
    pub async fn resolve(&self, alias: &str) -> Result<OriginalUrl, StorageError> {
        self.deadline(self.repository.get_url(alias)).await
    }

    /// Lists the live links of `user_id`.
    pub async fn user_links(
        &self,
        user_id: &str,
    ) -> Result<HashMap<Alias, OriginalUrl>, StorageError> {
        self.deadline(self.repository.get_user_urls(user_id)).await
    }

    /// Queues a soft-delete of `aliases` owned by `user_id`.
    ///
    /// Returns once the job is accepted; the delete is applied later.
    ///
    /// # Errors
    ///
    /// [`StorageError::Unavailable`] if the queue is stopped,
    /// [`StorageError::Timeout`] if it stayed full past the deadline.
    pub async fn delete_links(
        &self,
        user_id: &str,
        aliases: Vec<Alias>,
    ) -> Result<(), StorageError> {
        let count = aliases.len();
        let accepted = tokio::time::timeout(
            self.op_timeout,
            self.delete_queue.add(user_id, aliases),
        )
        .await
        .map_err(|_| StorageError::Timeout(self.op_timeout))?;

        accepted.map_err(|e| StorageError::unavailable(e.to_string()))?;
        debug!(user_id, count, "Delete job queued");
        Ok(())
    }

    pub async fn ping(&self) -> Result<(), StorageError> {
        self.deadline(self.repository.ping()).await
    }

    /// Builds the public short URL for `alias`.
    pub fn short_url(&self, alias: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), alias)
    }

    async fn existing_alias(
        &self,
        owner: Option<&str>,
        url: &str,
    ) -> Result<Option<Alias>, StorageError> {
        match self.deadline(self.repository.get_alias(owner, url)).await {
            Ok(alias) => Ok(Some(alias)),
            Err(StorageError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Generates an alias that neither resolves nor appears in `reserved`.
    async fn free_alias(&self, reserved: &HashSet<Alias>) -> Result<Alias, StorageError> {
        for _ in 0..MAX_ALIAS_ATTEMPTS {
            let alias = generate_alias();
            if reserved.contains(&alias) {
                continue;
            }

            match self.deadline(self.repository.get_url(&alias)).await {
                Err(StorageError::NotFound(_)) => return Ok(alias),
                Ok(_) | Err(StorageError::Deleted(_)) => {
                    debug!(alias = %alias, "Generated alias already in use");
                }
                Err(e) => return Err(e),
            }
        }

        Err(StorageError::AliasSpaceExhausted(MAX_ALIAS_ATTEMPTS))
    }

    async fn deadline<T, F>(&self, operation: F) -> Result<T, StorageError>
    where
        F: Future<Output = Result<T, StorageError>>,
    {
        tokio::time::timeout(self.op_timeout, operation)
            .await
            .map_err(|_| StorageError::Timeout(self.op_timeout))?
    }
}
