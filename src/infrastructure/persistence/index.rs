//! Bidirectional alias ↔ URL index shared by the memory and file backends.
//!
//! Both directions live behind one mutex so a batch becomes visible to readers
//! all at once. The lock is never held across I/O.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::entities::{Alias, OriginalUrl, UrlRecord};
use crate::error::StorageError;

/// Reverse-map key: the owner scope plus the URL.
type UrlKey = (Option<String>, OriginalUrl);

/// De-duplication scope of an owner. An empty owner id is anonymous, matching
/// the `COALESCE(user_id, '')` key of the relational index.
fn scope(owner: Option<&str>) -> Option<&str> {
    owner.filter(|id| !id.is_empty())
}

fn url_key(owner: Option<&str>, url: &str) -> UrlKey {
    (scope(owner).map(str::to_string), url.to_string())
}

#[derive(Debug, Default)]
struct IndexState {
    by_alias: HashMap<Alias, UrlRecord>,
    by_url: HashMap<UrlKey, Alias>,
}

impl IndexState {
    /// Inserts or overwrites `alias`, keeping both maps consistent.
    fn insert(&mut self, owner: Option<String>, alias: Alias, url: OriginalUrl) {
        if let Some(previous) = self.by_alias.remove(&alias) {
            let key = url_key(previous.owner.as_deref(), &previous.original_url);
            if self.by_url.get(&key) == Some(&alias) {
                self.by_url.remove(&key);
            }
        }

        self.by_url
            .insert(url_key(owner.as_deref(), &url), alias.clone());
        self.by_alias
            .insert(alias.clone(), UrlRecord::new(alias, url, owner));
    }
}

/// In-memory alias ↔ URL map with owner and deleted-flag tracking.
///
/// The reverse direction is scoped by owner: the same URL may have one live
/// alias per owner (anonymous records share the `None` scope).
#[derive(Debug, Default)]
pub struct BiIndex {
    state: Mutex<IndexState>,
}

impl BiIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, IndexState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies a batch atomically.
    ///
    /// Re-adding a live alias in the same owner scope overwrites it (last
    /// write wins). The whole batch is rejected, leaving the index untouched,
    /// if:
    /// - a URL already has a different live alias in the owner's scope, or the
    ///   batch maps one URL to two aliases ([`StorageError::Conflict`]);
    /// - an alias belongs to a deleted record or to another owner scope
    ///   ([`StorageError::AliasTaken`]).
    pub fn add(
        &self,
        owner: Option<&str>,
        batch: &HashMap<Alias, OriginalUrl>,
    ) -> Result<(), StorageError> {
        let mut state = self.lock();
        let mut claimed: HashMap<&str, &str> = HashMap::with_capacity(batch.len());

        for (alias, url) in batch {
            if let Some(existing) = state.by_alias.get(alias)
                && (existing.deleted || scope(existing.owner.as_deref()) != scope(owner))
            {
                return Err(StorageError::AliasTaken(alias.clone()));
            }

            if let Some(existing) = state.by_url.get(&url_key(owner, url))
                && existing != alias
            {
                return Err(StorageError::Conflict {
                    alias: Some(existing.clone()),
                });
            }

            if let Some(other) = claimed.insert(url, alias) {
                return Err(StorageError::Conflict {
                    alias: Some(other.to_string()),
                });
            }
        }

        let owner = owner.map(str::to_string);
        for (alias, url) in batch {
            state.insert(owner.clone(), alias.clone(), url.clone());
        }

        Ok(())
    }

    /// Replays one anonymous record from a durable log. Last write wins and no
    /// conflict checks apply.
    pub fn restore(&self, alias: Alias, url: OriginalUrl) {
        self.lock().insert(None, alias, url);
    }

    /// Resolves an alias, reporting soft-deleted records as
    /// [`StorageError::Deleted`].
    pub fn lookup_url(&self, alias: &str) -> Result<OriginalUrl, StorageError> {
        let state = self.lock();
        match state.by_alias.get(alias) {
            Some(record) if record.deleted => Err(StorageError::Deleted(alias.to_string())),
            Some(record) => Ok(record.original_url.clone()),
            None => Err(StorageError::not_found(format!("alias '{alias}'"))),
        }
    }

    /// Finds the live alias of `url` in the owner's scope.
    pub fn lookup_alias(&self, owner: Option<&str>, url: &str) -> Result<Alias, StorageError> {
        self.lock()
            .by_url
            .get(&url_key(owner, url))
            .cloned()
            .ok_or_else(|| StorageError::not_found(format!("alias for url '{url}'")))
    }

    /// Lists the live records owned by `user_id`.
    pub fn owned_by(&self, user_id: &str) -> HashMap<Alias, OriginalUrl> {
        self.lock()
            .by_alias
            .values()
            .filter(|record| !record.deleted && record.is_owned_by(user_id))
            .map(|record| (record.alias.clone(), record.original_url.clone()))
            .collect()
    }

    /// Flags the listed aliases owned by `user_id` as deleted and returns how
    /// many records changed. Unknown, foreign and already deleted aliases are
    /// skipped.
    pub fn mark_deleted(&self, user_id: &str, aliases: &[Alias]) -> usize {
        let mut guard = self.lock();
        let state = &mut *guard;
        let mut changed = 0;

        for alias in aliases {
            let Some(record) = state.by_alias.get_mut(alias) else {
                continue;
            };
            if record.deleted || !record.is_owned_by(user_id) {
                continue;
            }

            record.deleted = true;
            let key = url_key(record.owner.as_deref(), &record.original_url);
            if state.by_url.get(&key) == Some(alias) {
                state.by_url.remove(&key);
            }
            changed += 1;
        }

        changed
    }

    /// Number of records, deleted ones included.
    pub fn len(&self) -> usize {
        self.lock().by_alias.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
