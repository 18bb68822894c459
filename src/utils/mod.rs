//! Helper functions used across the crate.
//!
//! - [`alias_generator`] - Random alias and user id generation
//! - [`url_validator`] - Rejection of URLs that cannot be redirect targets
//! - [`db_error`] - PostgreSQL unique-violation classification

pub mod alias_generator;
pub mod db_error;
pub mod url_validator;
