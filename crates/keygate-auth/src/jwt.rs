//! JWT token management

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (username)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: i64,
}

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Issues and verifies signed, expiring access tokens
///
/// Tokens are stateless: a token is valid exactly when its signature checks
/// out under the server secret and its `exp` has not passed.
pub struct TokenCodec {
    keys: Option<SigningKeys>,
    algorithm: Algorithm,
    default_ttl: Duration,
}

impl TokenCodec {
    /// Create a codec from the auth settings
    pub fn new(config: &AuthConfig) -> Self {
        let keys = config
            .secret_key
            .as_deref()
            .filter(|secret| !secret.is_empty())
            .map(|secret| SigningKeys {
                encoding: EncodingKey::from_secret(secret.as_bytes()),
                decoding: DecodingKey::from_secret(secret.as_bytes()),
            });

        Self {
            keys,
            algorithm: config.algorithm,
            default_ttl: config.access_token_ttl,
        }
    }

    fn keys(&self) -> Result<&SigningKeys, AuthError> {
        self.keys
            .as_ref()
            .ok_or_else(|| AuthError::Configuration("SECRET_KEY is not configured".to_string()))
    }

    /// Sign a token for `subject` that expires `ttl` from now
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String, AuthError> {
        let keys = self.keys()?;

        let now = Utc::now();
        let exp = now.checked_add_signed(ttl).ok_or_else(|| {
            AuthError::Configuration(format!("Token lifetime out of range: {}", ttl))
        })?;

        let claims = Claims {
            sub: Some(subject.to_string()),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        debug!("Generating token for user: {}", subject);

        encode(&Header::new(self.algorithm), &claims, &keys.encoding)
            .map_err(|e| AuthError::Configuration(format!("Token signing failed: {}", e)))
    }

    /// Sign a token with the configured default lifetime
    ///
    /// Returns the token and its lifetime in seconds.
    pub fn issue_access_token(&self, subject: &str) -> Result<(String, i64), AuthError> {
        let token = self.issue(subject, self.default_ttl)?;
        Ok((token, self.default_ttl.num_seconds()))
    }

    /// Validate a token and return its claims unchanged
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let keys = self.keys()?;

        // The signature covers `header.payload`; check it before parsing
        // either segment so any altered byte reads as a bad signature.
        let (message, signature) = token
            .rsplit_once('.')
            .filter(|(message, _)| message.contains('.'))
            .ok_or(AuthError::MalformedToken)?;
        let signature_ok = jsonwebtoken::crypto::verify(
            signature,
            message.as_bytes(),
            &keys.decoding,
            self.algorithm,
        )
        .map_err(|_| AuthError::MalformedToken)?;
        if !signature_ok {
            return Err(AuthError::InvalidSignature);
        }

        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let token_data = decode::<Claims>(token, &keys.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::MalformedToken,
            }
        })?;

        // Second granularity, no leeway
        if Utc::now().timestamp() > token_data.claims.exp {
            return Err(AuthError::TokenExpired);
        }

        Ok(token_data.claims)
    }
}
