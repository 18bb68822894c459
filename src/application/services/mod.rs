//! Services built on the storage facade.

pub mod link_service;
pub mod user_service;

pub use link_service::{BatchItem, BatchResult, LinkService, ShortenOutcome};
pub use user_service::UserService;
