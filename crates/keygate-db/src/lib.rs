//! Keygate Credential Store
//!
//! This crate owns the persistent user table for Keygate. Records live in
//! SQLite via sqlx and are reached through the [`CredentialStore`] trait.

pub mod error;
pub mod models;
pub mod repository;
pub mod store;

pub use error::DbError;
pub use models::*;
pub use repository::Database;
pub use store::CredentialStore;
