//! Application layer services.
//!
//! Services validate input, generate aliases and bound every storage call
//! with a deadline. They hold repository traits, never concrete backends.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Shorten, resolve, list and delete links
//! - [`services::user_service::UserService`] - User registration and authentication

pub mod services;
