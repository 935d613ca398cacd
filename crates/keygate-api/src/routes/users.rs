//! Routes for the authenticated user

use axum::{Json, Router, middleware, routing::get};
use keygate_auth::{AuthGate, AuthenticatedUser, require_active_user};
use std::sync::Arc;
use tracing::debug;

use crate::state::AppState;

use super::types::{ItemResponse, UserResponse};

/// GET /users/me
async fn read_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<UserResponse> {
    Json(user.into())
}

/// GET /users/me/items
async fn read_own_items(AuthenticatedUser(user): AuthenticatedUser) -> Json<Vec<ItemResponse>> {
    debug!("User {} requested items", user.username);

    Json(vec![ItemResponse {
        item_id: 1,
        owner: user.username,
    }])
}

/// Create user routes, all behind the auth gate
pub fn routes(gate: Arc<AuthGate>) -> Router<AppState> {
    Router::new()
        .route("/users/me", get(read_me))
        .route("/users/me/items", get(read_own_items))
        .route_layer(middleware::from_fn_with_state(gate, require_active_user))
}
