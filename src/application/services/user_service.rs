//! Registration and password authentication on top of the user sub-store.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::entities::{NewUser, User};
use crate::domain::repositories::UserRepository;
use crate::error::StorageError;
use crate::utils::alias_generator::generate_user_id;

type HmacSha256 = Hmac<Sha256>;

/// Registers users and checks their passwords.
///
/// Passwords are stored as HMAC-SHA256 digests keyed by `password_secret`,
/// so a copy of the user store alone cannot be used to verify guesses.
pub struct UserService<R: UserRepository + ?Sized> {
    repository: Arc<R>,
    password_secret: String,
}

impl<R: UserRepository + ?Sized> UserService<R> {
    pub fn new(repository: Arc<R>, password_secret: impl Into<String>) -> Self {
        Self {
            repository,
            password_secret: password_secret.into(),
        }
    }

    /// Returns the 64-character lowercase hex digest of `password`.
    fn hash_password(&self, password: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.password_secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(password.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Creates a user with a fresh external user id.
    ///
    /// # Errors
    ///
    /// - [`StorageError::Validation`] for an empty login or password
    /// - [`StorageError::DuplicateLogin`] if the login is taken
    pub async fn register(&self, login: &str, password: &str) -> Result<User, StorageError> {
        if login.trim().is_empty() {
            return Err(StorageError::Validation("login must not be empty".into()));
        }
        if password.is_empty() {
            return Err(StorageError::Validation("password must not be empty".into()));
        }

        let user = self
            .repository
            .create_user(NewUser {
                login: login.to_string(),
                password_hash: self.hash_password(password),
                user_id: generate_user_id(),
            })
            .await?;

        info!(login = %user.login, id = user.id, "User registered");
        Ok(user)
    }

    /// Returns the user whose login and password match.
    ///
    /// # Errors
    ///
    /// [`StorageError::InvalidCredentials`] for an unknown login or a wrong
    /// password; the two cases are not distinguished.
    pub async fn authenticate(&self, login: &str, password: &str) -> Result<User, StorageError> {
        let Some(user) = self.repository.find_by_login(login).await? else {
            debug!(login, "Login attempt for unknown user");
            return Err(StorageError::InvalidCredentials);
        };

        if user.password != self.hash_password(password) {
            debug!(login, "Login attempt with wrong password");
            return Err(StorageError::InvalidCredentials);
        }

        Ok(user)
    }
}
