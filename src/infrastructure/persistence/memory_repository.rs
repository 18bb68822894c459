//! In-memory backend. Nothing survives a restart.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use super::index::BiIndex;
use crate::domain::entities::{Alias, NewUser, OriginalUrl, User};
use crate::domain::repositories::{UrlRepository, UserRepository};
use crate::error::StorageError;

/// URL storage backed only by a [`BiIndex`].
///
/// Models ownership and soft-delete the same way the PostgreSQL backend does,
/// which makes it the reference backend for tests.
#[derive(Debug, Default)]
pub struct MemoryUrlRepository {
    index: BiIndex,
}

impl MemoryUrlRepository {
    pub fn new() -> Self {
        debug!("Using in-memory URL storage");
        Self::default()
    }

    /// Number of stored records, deleted ones included.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[async_trait]
impl UrlRepository for MemoryUrlRepository {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn add(
        &self,
        owner: Option<&str>,
        batch: HashMap<Alias, OriginalUrl>,
    ) -> Result<(), StorageError> {
        self.index.add(owner, &batch)
    }

    async fn get_url(&self, alias: &str) -> Result<OriginalUrl, StorageError> {
        self.index.lookup_url(alias)
    }

    async fn get_alias(&self, owner: Option<&str>, url: &str) -> Result<Alias, StorageError> {
        self.index.lookup_alias(owner, url)
    }

    async fn get_user_urls(
        &self,
        user_id: &str,
    ) -> Result<HashMap<Alias, OriginalUrl>, StorageError> {
        Ok(self.index.owned_by(user_id))
    }

    async fn delete_user_urls(
        &self,
        user_id: &str,
        aliases: &[Alias],
    ) -> Result<(), StorageError> {
        let changed = self.index.mark_deleted(user_id, aliases);
        debug!(user_id, requested = aliases.len(), changed, "Soft-deleted aliases");
        Ok(())
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

#[derive(Debug, Default)]
struct UserTable {
    by_login: HashMap<String, User>,
    last_id: i64,
}

/// User storage kept in a login-keyed map.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: Mutex<UserTable>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create_user(&self, new_user: NewUser) -> Result<User, StorageError> {
        let mut table = self.users.lock().unwrap_or_else(PoisonError::into_inner);

        if table.by_login.contains_key(&new_user.login) {
            return Err(StorageError::DuplicateLogin(new_user.login));
        }

        table.last_id += 1;
        let user = new_user.into_user(table.last_id);
        table.by_login.insert(user.login.clone(), user.clone());

        Ok(user)
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, StorageError> {
        let table = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(table.by_login.get(login).cloned())
    }
}
