//! Registration and token routes

use axum::{
    Form, Json, Router,
    extract::{
        State,
        rejection::{FormRejection, JsonRejection},
    },
    http::StatusCode,
    routing::post,
};
use keygate_auth::{AccessToken, RegistrationRequest};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{TokenForm, UserResponse};

/// POST /register
async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegistrationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let Json(request) = body.map_err(|rejection| {
        debug!("Rejected registration body: {}", rejection.body_text());
        ApiError::BadRequest(rejection.body_text())
    })?;

    let credential = state.auth.register(request).await?;

    Ok((StatusCode::CREATED, Json(credential.into())))
}

/// POST /token
async fn token(
    State(state): State<AppState>,
    form: Result<Form<TokenForm>, FormRejection>,
) -> Result<Json<AccessToken>, ApiError> {
    let Form(form) = form.map_err(|rejection| {
        debug!("Rejected login form: {}", rejection.body_text());
        ApiError::BadRequest(rejection.body_text())
    })?;

    let token = state.auth.login(&form.username, &form.password).await?;

    Ok(Json(token))
}

/// Create auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/token", post(token))
}
