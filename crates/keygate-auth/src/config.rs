//! Immutable settings for the credential lifecycle

use chrono::Duration;
use jsonwebtoken::Algorithm;
use std::str::FromStr;

use crate::error::AuthError;

/// Default access token lifetime in minutes
pub const DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 30;

/// Longest accepted access token lifetime in minutes (one year)
pub const MAX_ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 365 * 24 * 60;

/// Argon2 work factor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

/// Auth settings, built once at start-up and shared read-only
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC signing secret; `None` disables token issuance and verification
    pub secret_key: Option<String>,
    /// Symmetric signature algorithm
    pub algorithm: Algorithm,
    /// Lifetime of tokens issued at login
    pub access_token_ttl: Duration,
    /// Work factor for new password hashes
    pub hash_cost: HashCost,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            algorithm: Algorithm::HS256,
            access_token_ttl: Duration::minutes(DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES),
            hash_cost: HashCost::default(),
        }
    }
}

impl AuthConfig {
    /// Parse an algorithm identifier, accepting only HMAC variants
    pub fn parse_algorithm(name: &str) -> Result<Algorithm, AuthError> {
        let algorithm = Algorithm::from_str(name)
            .map_err(|_| AuthError::Configuration(format!("Unknown algorithm: {}", name)))?;

        match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
            other => Err(AuthError::Configuration(format!(
                "Algorithm {:?} is not a symmetric signature algorithm",
                other
            ))),
        }
    }

    /// Whether a non-empty signing secret is present
    pub fn has_secret(&self) -> bool {
        self.secret_key.as_deref().is_some_and(|s| !s.is_empty())
    }
}
