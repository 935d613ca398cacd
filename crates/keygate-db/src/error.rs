//! Database error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Username '{0}' already registered")]
    DuplicateUsername(String),

    #[error("Email '{0}' already registered")]
    DuplicateEmail(String),

    #[error("Migration error: {0}")]
    Migration(String),
}
