//! Error taxonomy shared by every storage backend and service.
//!
//! Backends return [`StorageError`] unchanged to their callers; only the delete
//! pipeline swallows errors (after logging them).

use std::time::Duration;
use thiserror::Error;

use crate::utils::db_error::{UniqueConstraint, classify_unique_violation};

/// Errors produced by the storage facade and the services built on it.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Unknown alias, URL or login.
    #[error("{0} not found")]
    NotFound(String),

    /// The alias exists but has been soft-deleted.
    #[error("alias '{0}' has been deleted")]
    Deleted(String),

    /// The URL is already shortened for this identity.
    ///
    /// Carries the existing alias when the backend knows it.
    #[error("url is already shortened")]
    Conflict { alias: Option<String> },

    /// The alias is already used by another record (live or deleted).
    #[error("alias '{0}' is already taken")]
    AliasTaken(String),

    #[error("user with login '{0}' already exists")]
    DuplicateLogin(String),

    #[error("invalid login or password")]
    InvalidCredentials,

    /// The active backend does not implement the operation.
    #[error("{operation} is not supported by the {backend} backend")]
    Unsupported {
        operation: &'static str,
        backend: &'static str,
    },

    /// Connection, ping or closed-handle failure.
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("storage operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("failed to generate a free alias after {0} attempts")]
    AliasSpaceExhausted(usize),

    #[error("corrupt log entry at line {line}: {source}")]
    CorruptLog {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl StorageError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn unsupported(operation: &'static str, backend: &'static str) -> Self {
        Self::Unsupported { operation, backend }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }

    /// Returns true for the "no such record" family (not found or deleted).
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Deleted(_))
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(e: sqlx::Error) -> Self {
        match classify_unique_violation(&e) {
            Some(UniqueConstraint::Alias) => {
                return Self::AliasTaken(constraint_detail(&e));
            }
            Some(UniqueConstraint::OwnerUrl) => return Self::Conflict { alias: None },
            Some(UniqueConstraint::Login) => {
                return Self::DuplicateLogin(constraint_detail(&e));
            }
            Some(UniqueConstraint::Other) | None => {}
        }

        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::Unavailable(e.to_string())
            }
            other => Self::Database(other),
        }
    }
}

/// Pulls the offending value out of a PostgreSQL unique-violation detail
/// (`Key (alias)=(abc) already exists.`), falling back to the raw message.
fn constraint_detail(e: &sqlx::Error) -> String {
    let Some(db) = e.as_database_error() else {
        return e.to_string();
    };
    let message = db.message().to_string();
    let detail = db
        .try_downcast_ref::<sqlx::postgres::PgDatabaseError>()
        .and_then(|pg| pg.detail())
        .map(str::to_string);

    detail
        .as_deref()
        .and_then(|d| d.split_once(")=("))
        .and_then(|(_, rest)| rest.split_once(')'))
        .map(|(value, _)| value.to_string())
        .unwrap_or(message)
}
