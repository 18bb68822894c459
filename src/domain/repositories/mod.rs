//! Repository trait definitions for the domain layer.
//!
//! Traits define the storage contract; implementations live in
//! `crate::infrastructure::persistence`, one per backend.
//!
//! # Available Repositories
//!
//! - [`UrlRepository`] - The storage facade for URL records
//! - [`UserRepository`] - The user sub-store
//!
//! # Testing
//!
//! See integration tests in `tests/repository_*.rs` for usage examples.

pub mod url_repository;
pub mod user_repository;

pub use url_repository::UrlRepository;
pub use user_repository::UserRepository;

#[cfg(test)]
pub use user_repository::MockUserRepository;
