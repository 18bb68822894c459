//! Core domain entities.
//!
//! - [`UrlRecord`] - An alias → URL mapping with owner and deleted flag
//! - [`User`] - A registered user
//!
//! Creation inputs use separate structs (`NewUser`), following the same
//! "new type for inserts" convention throughout the crate.

pub mod url_record;
pub mod user;

pub use url_record::{Alias, OriginalUrl, UrlRecord};
pub use user::{NewUser, User};
