//! Authentication gate and middleware for Axum

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use keygate_db::{Credential, CredentialStore};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::AuthError;
use crate::jwt::TokenCodec;

/// Active user resolved for the current request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Credential);

/// Extract bearer token from authorization header
pub fn extract_bearer_token(header: &str) -> Result<&str, AuthError> {
    let (scheme, token) = header
        .split_once(' ')
        .ok_or(AuthError::InvalidAuthHeader)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidAuthHeader);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }
    Ok(token)
}

/// Maps a bearer token to an active credential
pub struct AuthGate {
    codec: Arc<TokenCodec>,
    store: Arc<dyn CredentialStore>,
}

impl AuthGate {
    pub fn new(codec: Arc<TokenCodec>, store: Arc<dyn CredentialStore>) -> Self {
        Self { codec, store }
    }

    /// Resolve the user behind a token
    ///
    /// A bad token, a token without a subject and a subject with no stored
    /// user all fail with the same `Unauthorized`. A known but disabled
    /// user fails with `Forbidden`.
    pub async fn authenticate(&self, token: &str) -> Result<Credential, AuthError> {
        let claims = self.codec.verify(token).map_err(|e| {
            if e.is_internal() {
                return e;
            }
            debug!("Token rejected: {}", e.kind());
            AuthError::Unauthorized
        })?;

        let username = claims.sub.ok_or_else(|| {
            warn!("Token payload missing 'sub' field");
            AuthError::Unauthorized
        })?;

        let credential = self
            .store
            .find_by_username(&username)
            .await?
            .ok_or_else(|| {
                warn!("User not found: {}", username);
                AuthError::Unauthorized
            })?;

        if !credential.is_active {
            warn!("Inactive user attempt: {}", credential.username);
            return Err(AuthError::Forbidden);
        }

        debug!("Authenticated user: {}", credential.username);
        Ok(credential)
    }

    /// Resolve the user named by an `Authorization` header value
    pub async fn authenticate_header(&self, header: Option<&str>) -> Result<Credential, AuthError> {
        let header = header.ok_or(AuthError::MissingAuthHeader)?;
        let token = extract_bearer_token(header)?;
        self.authenticate(token).await
    }
}

/// Authentication middleware
///
/// Rejects the request unless it carries a bearer token for an active user.
/// On success the user is added to the request extensions as
/// [`AuthenticatedUser`].
pub async fn require_active_user(
    State(gate): State<Arc<AuthGate>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let credential = gate.authenticate_header(auth_header).await.inspect_err(|e| {
        metrics::counter!("keygate_gate_rejections_total", "reason" => e.kind()).increment(1);
    })?;

    request.extensions_mut().insert(AuthenticatedUser(credential));

    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AuthError::Unauthorized)
    }
}
