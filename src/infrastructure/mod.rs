//! Infrastructure layer: concrete storage backends.
//!
//! # Modules
//!
//! - [`persistence`] - Memory, file and PostgreSQL implementations of the
//!   domain repository traits, plus the [`persistence::Storage`] facade

pub mod persistence;
