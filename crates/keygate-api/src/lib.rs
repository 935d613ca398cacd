//! Keygate REST API
//!
//! This crate provides the Axum-based HTTP surface for Keygate:
//! registration, token issuance, and the routes guarded by the auth gate.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
