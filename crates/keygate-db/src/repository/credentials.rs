//! Credential operations

use chrono::Utc;
use sqlx::Row;
use tracing::{debug, warn};

use crate::error::DbError;
use crate::models::{Credential, NewCredential};
use crate::repository::Database;

/// Translate a unique-index violation raised by the insert into the
/// matching duplicate error. Anything else is passed through.
fn map_insert_error(err: sqlx::Error, credential: &NewCredential) -> DbError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.is_unique_violation()
    {
        warn!(
            "Unique constraint rejected insert for user: {}",
            credential.username
        );
        return if db_err.message().contains("users.email") {
            DbError::DuplicateEmail(credential.email.clone())
        } else {
            DbError::DuplicateUsername(credential.username.clone())
        };
    }
    DbError::Connection(err)
}

impl Database {
    // ==================== Credential Operations ====================

    /// Insert a new credential
    ///
    /// The uniqueness check and the insert share one transaction. A single
    /// lookup covers both unique fields and a username collision is reported
    /// ahead of an email collision. The transaction takes the write lock up
    /// front, so overlapping registrations queue on the busy timeout instead
    /// of failing a read-to-write upgrade. The unique indexes still reject a
    /// duplicate that slips past the lookup, and the transaction is rolled
    /// back on drop so nothing is written.
    pub async fn insert_credential(&self, credential: NewCredential) -> Result<Credential, DbError> {
        let now = Utc::now();
        let mut tx = self.pool().begin_with("BEGIN IMMEDIATE").await?;

        let conflicts = sqlx::query(
            r#"
            SELECT username, email
            FROM users
            WHERE username = ? OR email = ?
            "#,
        )
        .bind(&credential.username)
        .bind(&credential.email)
        .fetch_all(&mut *tx)
        .await?;

        if !conflicts.is_empty() {
            let username_taken = conflicts.iter().any(|row| {
                row.try_get::<String, _>("username")
                    .map(|u| u == credential.username)
                    .unwrap_or(false)
            });
            return Err(if username_taken {
                DbError::DuplicateUsername(credential.username)
            } else {
                DbError::DuplicateEmail(credential.email)
            });
        }

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, is_active, created_at, updated_at)
            VALUES (?, ?, ?, 1, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&credential.username)
        .bind(&credential.email)
        .bind(&credential.password_hash)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_insert_error(e, &credential))?;

        let id: i64 = result.get("id");

        tx.commit()
            .await
            .map_err(|e| map_insert_error(e, &credential))?;

        debug!("Inserted credential {} for user: {}", id, credential.username);

        Ok(Credential {
            id,
            username: credential.username,
            email: credential.email,
            password_hash: credential.password_hash,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a credential by username
    pub async fn get_credential_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Credential>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, is_active, created_at, updated_at
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(self.pool())
        .await?;

        result
            .map(|row| Credential::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// Get a credential by ID
    pub async fn get_credential_by_id(&self, id: i64) -> Result<Option<Credential>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, is_active, created_at, updated_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        result
            .map(|row| Credential::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// Enable or disable a credential
    pub async fn set_credential_active(&self, id: i64, is_active: bool) -> Result<bool, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(is_active)
        .bind(now.to_rfc3339())
        .bind(id)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a credential
    pub async fn delete_credential(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count stored credentials
    pub async fn count_credentials(&self) -> Result<i64, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM users")
            .fetch_one(self.pool())
            .await?;
        Ok(result.get("count"))
    }
}
