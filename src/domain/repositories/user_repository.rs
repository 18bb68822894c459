//! Repository trait for the user sub-store.

use crate::domain::entities::{NewUser, User};
use crate::error::StorageError;
use async_trait::async_trait;

/// Stores users created by registration and read by authentication.
///
/// Users are never updated or removed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates a user and returns it with its assigned numeric id.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::DuplicateLogin`] if the login is taken.
    async fn create_user(&self, new_user: NewUser) -> Result<User, StorageError>;

    /// Finds a user by login.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(User))` if found
    /// - `Ok(None)` if not found
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, StorageError>;

    /// Releases resources not shared with the URL store.
    async fn close(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
