//! File backend: an in-memory index made durable by append-only JSON logs.
//!
//! URL records go to `<path>` as `{"id","alias","url"}` lines; users go to
//! `<path>.users`. Both logs are replayed in file order before the backend
//! accepts traffic. The log format carries no owner or deleted flag, so this
//! backend does not support per-user listing or deletion and de-duplicates
//! URLs globally.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info};

use super::index::BiIndex;
use super::json_log::{JsonLog, users_log_path};
use crate::domain::entities::{Alias, NewUser, OriginalUrl, User};
use crate::domain::repositories::{UrlRepository, UserRepository};
use crate::error::StorageError;

const BACKEND: &str = "file";

/// One line of the URL log.
#[derive(Debug, Serialize, Deserialize)]
struct UrlLogEntry {
    id: String,
    alias: Alias,
    url: OriginalUrl,
}

#[derive(Debug)]
struct UrlLog {
    log: JsonLog,
    last_id: u64,
}

/// URL storage persisted to an append-only log.
#[derive(Debug)]
pub struct FileUrlRepository {
    index: BiIndex,
    log: AsyncMutex<UrlLog>,
}

impl FileUrlRepository {
    /// Opens the log at `path`, creating it if missing, and replays it.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be opened or contains a malformed line.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let (log, entries) = JsonLog::open::<UrlLogEntry>(path).await?;

        let index = BiIndex::new();
        let replayed = entries.len();
        for entry in entries {
            index.restore(entry.alias, entry.url);
        }

        info!(
            path = %path.display(),
            lines = replayed,
            records = index.len(),
            "File URL storage loaded"
        );

        Ok(Self {
            index,
            log: AsyncMutex::new(UrlLog {
                log,
                last_id: replayed as u64,
            }),
        })
    }

    /// Path of the URL log.
    pub async fn path(&self) -> PathBuf {
        self.log.lock().await.log.path().to_path_buf()
    }
}

#[async_trait]
impl UrlRepository for FileUrlRepository {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    async fn add(
        &self,
        owner: Option<&str>,
        batch: HashMap<Alias, OriginalUrl>,
    ) -> Result<(), StorageError> {
        if batch.is_empty() {
            return Ok(());
        }

        // Holding the log lock across both steps keeps index and file order aligned.
        let mut guard = self.log.lock().await;
        if !guard.log.is_open() {
            return Err(StorageError::unavailable("file storage is closed"));
        }

        if owner.is_some() {
            debug!("File storage does not record owners; storing batch as anonymous");
        }
        self.index.add(None, &batch)?;

        let state = &mut *guard;
        let mut last_id = state.last_id;
        let entries: Vec<UrlLogEntry> = batch
            .into_iter()
            .map(|(alias, url)| {
                last_id += 1;
                UrlLogEntry {
                    id: last_id.to_string(),
                    alias,
                    url,
                }
            })
            .collect();

        state.log.append(entries).await?;
        state.last_id = last_id;

        Ok(())
    }

    async fn get_url(&self, alias: &str) -> Result<OriginalUrl, StorageError> {
        self.index.lookup_url(alias)
    }

    async fn get_alias(&self, _owner: Option<&str>, url: &str) -> Result<Alias, StorageError> {
        self.index.lookup_alias(None, url)
    }

    async fn get_user_urls(
        &self,
        _user_id: &str,
    ) -> Result<HashMap<Alias, OriginalUrl>, StorageError> {
        Err(StorageError::unsupported("get_user_urls", BACKEND))
    }

    async fn delete_user_urls(
        &self,
        _user_id: &str,
        _aliases: &[Alias],
    ) -> Result<(), StorageError> {
        Err(StorageError::unsupported("delete_user_urls", BACKEND))
    }

    async fn ping(&self) -> Result<(), StorageError> {
        if self.log.lock().await.log.is_open() {
            Ok(())
        } else {
            Err(StorageError::unavailable("file storage is closed"))
        }
    }

    async fn close(&self) -> Result<(), StorageError> {
        let mut guard = self.log.lock().await;
        if guard.log.is_open() {
            guard.log.close().await?;
            info!(path = %guard.log.path().display(), "File URL storage closed");
        }
        Ok(())
    }
}

#[derive(Debug)]
struct UserLog {
    log: JsonLog,
    last_id: i64,
}

/// User storage persisted to `<path>.users`.
#[derive(Debug)]
pub struct FileUserRepository {
    users: Mutex<HashMap<String, User>>,
    log: AsyncMutex<UserLog>,
}

impl FileUserRepository {
    /// Opens the users log that sits next to the URL log at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let users_path = users_log_path(path.as_ref());
        let (log, entries) = JsonLog::open::<User>(&users_path).await?;

        let last_id = entries.iter().map(|u| u.id).max().unwrap_or(0);
        let users: HashMap<String, User> = entries
            .into_iter()
            .map(|user| (user.login.clone(), user))
            .collect();

        info!(
            path = %users_path.display(),
            users = users.len(),
            "File user storage loaded"
        );

        Ok(Self {
            users: Mutex::new(users),
            log: AsyncMutex::new(UserLog { log, last_id }),
        })
    }

    fn contains(&self, login: &str) -> bool {
        self.users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(login)
    }
}

#[async_trait]
impl UserRepository for FileUserRepository {
    async fn create_user(&self, new_user: NewUser) -> Result<User, StorageError> {
        let mut guard = self.log.lock().await;

        if self.contains(&new_user.login) {
            return Err(StorageError::DuplicateLogin(new_user.login));
        }

        let user = new_user.into_user(guard.last_id + 1);
        guard.log.append([&user]).await?;
        guard.last_id = user.id;

        self.users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user.login.clone(), user.clone());

        Ok(user)
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, StorageError> {
        Ok(self
            .users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(login)
            .cloned())
    }

    async fn close(&self) -> Result<(), StorageError> {
        self.log.lock().await.log.close().await
    }
}
