//! Domain layer containing entities, storage contracts and the delete pipeline.
//!
//! # Architecture
//!
//! - [`entities`] - Core data structures
//! - [`repositories`] - Storage trait definitions
//! - [`delete_job`] - Soft-delete request model
//! - [`delete_worker`] - Background worker pool applying soft-deletes
//!
//! # Delete Flow
//!
//! 1. A caller hands `(owner, aliases)` to [`delete_worker::DeleteQueue::add`]
//! 2. A [`delete_job::DeleteJob`] waits in the shared channel
//! 3. One worker calls [`repositories::UrlRepository::delete_user_urls`]
//! 4. Failures are logged and the job is dropped

pub mod delete_job;
pub mod delete_worker;
pub mod entities;
pub mod repositories;
