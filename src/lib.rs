//! # Shortener Store
//!
//! Storage core for a URL shortener: maps long URLs to short aliases, tracks
//! ownership per user and soft-deletes a user's aliases in the background.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Entities, repository traits and the delete pipeline
//! - **Application Layer** ([`application`]) - Link and user services
//! - **Infrastructure Layer** ([`infrastructure`]) - Memory, file and PostgreSQL backends
//!
//! ## Backends
//!
//! One backend is chosen at startup from configuration (see [`config`]):
//!
//! - PostgreSQL when `DATABASE_DSN` is set
//! - an append-only JSON log at `FILE_STORAGE_PATH`, or at
//!   `<temp dir>/short-url-db.json` when the variable is unset
//! - process memory when `FILE_STORAGE_PATH` is set to an empty string
//!
//! ## Quick Start
//!
//! ```bash
//! export FILE_STORAGE_PATH=/tmp/urls.json
//! cargo run -- shorten https://example.com/some/long/path
//! cargo run -- resolve AbCdEfGh
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod logging;
pub mod state;
pub mod utils;

pub use error::StorageError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{
        BatchItem, BatchResult, LinkService, ShortenOutcome, UserService,
    };
    pub use crate::config::{BackendKind, Config};
    pub use crate::domain::delete_worker::{DeleteQueue, QueueStopped};
    pub use crate::domain::entities::{Alias, NewUser, OriginalUrl, UrlRecord, User};
    pub use crate::domain::repositories::{UrlRepository, UserRepository};
    pub use crate::error::StorageError;
    pub use crate::infrastructure::persistence::Storage;
    pub use crate::state::AppState;
}
