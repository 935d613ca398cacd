//! Request/Response DTOs

use keygate_db::Credential;
use serde::{Deserialize, Serialize};

// ==================== Auth Types ====================

/// Login form (`application/x-www-form-urlencoded`)
#[derive(Deserialize)]
pub struct TokenForm {
    pub username: String,
    pub password: String,
}

// ==================== User Types ====================

/// Public view of a credential (never includes the password hash)
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Credential> for UserResponse {
    fn from(credential: Credential) -> Self {
        Self {
            id: credential.id,
            username: credential.username,
            email: credential.email,
            is_active: credential.is_active,
            created_at: credential.created_at.to_rfc3339(),
            updated_at: credential.updated_at.to_rfc3339(),
        }
    }
}

/// Item owned by the current user
#[derive(Debug, Serialize, Deserialize)]
pub struct ItemResponse {
    pub item_id: i64,
    pub owner: String,
}
