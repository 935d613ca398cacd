//! Credential store trait

use async_trait::async_trait;

use crate::error::DbError;
use crate::models::{Credential, NewCredential};
use crate::repository::Database;

/// Credential store trait
///
/// The only way credentials are read or created by the auth layer.
/// Implementations must make `create` atomic: a rejected insert leaves no
/// record behind, and a uniqueness collision is reported as
/// [`DbError::DuplicateUsername`] or [`DbError::DuplicateEmail`] whether it
/// is detected by the pre-check or by the store's own unique index.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up a credential by its username
    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, DbError>;

    /// Persist a new credential after checking both unique fields
    async fn create(&self, credential: NewCredential) -> Result<Credential, DbError>;
}

#[async_trait]
impl CredentialStore for Database {
    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, DbError> {
        self.get_credential_by_username(username).await
    }

    async fn create(&self, credential: NewCredential) -> Result<Credential, DbError> {
        self.insert_credential(credential).await
    }
}
