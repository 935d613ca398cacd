//! Authentication error types

use axum::http::header::WWW_AUTHENTICATE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use keygate_db::DbError;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// A single rejected registration field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Username already registered")]
    DuplicateUsername(String),

    #[error("Email already registered")]
    DuplicateEmail(String),

    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired")]
    TokenExpired,

    #[error("Malformed token")]
    MalformedToken,

    #[error("Missing authorization header")]
    MissingAuthHeader,

    #[error("Invalid authorization header format")]
    InvalidAuthHeader,

    #[error("Could not validate credentials")]
    Unauthorized,

    #[error("Inactive user")]
    Forbidden,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}

impl AuthError {
    /// Short label for metrics and audit logs
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::Validation(_) => "validation",
            AuthError::DuplicateUsername(_) => "duplicate_username",
            AuthError::DuplicateEmail(_) => "duplicate_email",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "expired",
            AuthError::MalformedToken => "malformed",
            AuthError::MissingAuthHeader => "missing_header",
            AuthError::InvalidAuthHeader => "invalid_header",
            AuthError::Unauthorized => "unauthorized",
            AuthError::Forbidden => "inactive",
            AuthError::Configuration(_) => "configuration",
            AuthError::Persistence(_) => "persistence",
            AuthError::PasswordHash(_) => "password_hash",
        }
    }

    /// Whether this is a server-side failure rather than a caller mistake
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AuthError::Configuration(_) | AuthError::Persistence(_) | AuthError::PasswordHash(_)
        )
    }
}

impl From<DbError> for AuthError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::DuplicateUsername(username) => AuthError::DuplicateUsername(username),
            DbError::DuplicateEmail(email) => AuthError::DuplicateEmail(email),
            other => AuthError::Persistence(other.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if self.is_internal() {
            error!("Request failed: {}", self);
        }

        let (status, body) = match &self {
            AuthError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Validation failed", "fields": fields }),
            ),
            AuthError::DuplicateUsername(_) | AuthError::DuplicateEmail(_) => {
                (StatusCode::BAD_REQUEST, json!({ "error": self.to_string() }))
            }
            AuthError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Incorrect username or password" }),
            ),
            AuthError::InvalidSignature
            | AuthError::TokenExpired
            | AuthError::MalformedToken
            | AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Could not validate credentials" }),
            ),
            AuthError::Forbidden => (StatusCode::BAD_REQUEST, json!({ "error": "Inactive user" })),
            AuthError::Configuration(_) | AuthError::Persistence(_) | AuthError::PasswordHash(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal error" }),
            ),
        };

        let mut response = (status, axum::Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
