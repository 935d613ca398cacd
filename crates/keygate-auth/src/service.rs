//! Registration and login

use keygate_db::{Credential, CredentialStore, NewCredential};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::AuthError;
use crate::jwt::TokenCodec;
use crate::password::PasswordHasher;
use crate::validation::RegistrationRequest;

/// Token handed back by a successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: i64,
}

/// Orchestrates registration and login over a credential store
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<PasswordHasher>,
    codec: Arc<TokenCodec>,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: Arc<PasswordHasher>,
        codec: Arc<TokenCodec>,
    ) -> Self {
        Self {
            store,
            hasher,
            codec,
        }
    }

    /// Register a new account
    ///
    /// Input is validated before anything else happens. The store checks
    /// both unique fields and inserts in one transaction.
    pub async fn register(&self, request: RegistrationRequest) -> Result<Credential, AuthError> {
        debug!("Registration attempt for user: {}", request.username);

        if let Err(e) = request.check() {
            warn!("Registration rejected for {}: invalid input", request.username);
            metrics::counter!("keygate_registrations_total", "outcome" => "invalid").increment(1);
            return Err(e);
        }

        let password_hash = self.hasher.hash(&request.password)?;

        let result = self
            .store
            .create(NewCredential {
                username: request.username.clone(),
                email: request.email,
                password_hash,
            })
            .await
            .map_err(AuthError::from);

        match result {
            Ok(credential) => {
                info!("New user registered: {}", credential.username);
                metrics::counter!("keygate_registrations_total", "outcome" => "success")
                    .increment(1);
                Ok(credential)
            }
            Err(e) => {
                match &e {
                    AuthError::DuplicateUsername(_) => {
                        warn!("Registration attempt with existing username: {}", request.username)
                    }
                    AuthError::DuplicateEmail(_) => {
                        warn!("Registration attempt with existing email for user: {}", request.username)
                    }
                    _ => {}
                }
                metrics::counter!("keygate_registrations_total", "outcome" => e.kind())
                    .increment(1);
                Err(e)
            }
        }
    }

    /// Check a username and password and issue an access token
    ///
    /// An unknown user and a wrong password fail identically. The unknown
    /// user path still runs a hash verification to keep timings comparable.
    pub async fn login(&self, username: &str, password: &str) -> Result<AccessToken, AuthError> {
        debug!("Login attempt for user: {}", username);

        let credential = self.store.find_by_username(username).await?;

        let credential = match credential {
            Some(c) if self.hasher.verify(password, &c.password_hash) => c,
            Some(_) => return Err(self.reject_login(username)),
            None => {
                self.hasher.verify_dummy(password);
                return Err(self.reject_login(username));
            }
        };

        let (access_token, expires_in) = self.codec.issue_access_token(&credential.username)?;

        info!("User authenticated: {}", credential.username);
        metrics::counter!("keygate_logins_total", "outcome" => "success").increment(1);

        Ok(AccessToken {
            access_token,
            token_type: "bearer".to_string(),
            expires_in,
        })
    }

    fn reject_login(&self, username: &str) -> AuthError {
        warn!("Failed login attempt for username: {}", username);
        metrics::counter!("keygate_logins_total", "outcome" => "failure").increment(1);
        AuthError::InvalidCredentials
    }
}
