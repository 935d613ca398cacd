//! Keygate Authentication
//!
//! This crate holds the credential lifecycle: password hashing, signed
//! access tokens, registration and login, and the gate that turns a bearer
//! token into an active user for the duration of one request.

pub mod config;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod service;
pub mod validation;

pub use config::{AuthConfig, HashCost};
pub use error::{AuthError, FieldError};
pub use jwt::{Claims, TokenCodec};
pub use middleware::{AuthGate, AuthenticatedUser, extract_bearer_token, require_active_user};
pub use password::PasswordHasher;
pub use service::{AccessToken, AuthService};
pub use validation::RegistrationRequest;
