//! Login route

use axum::{Json, Router, extract::State, routing::post};
use contactbook_auth::messages::AUTHENTICATION_SUCCESS;
use contactbook_auth::{AuthRejection, LenientJson, LoginRequest};

use super::types::LoginResponse;
use crate::state::AppState;

/// POST /login
///
/// The flow runs its own validation, so the body is read leniently.
async fn login(
    State(state): State<AppState>,
    LenientJson(request): LenientJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthRejection> {
    let token = state.login.login(request).await?;

    Ok(Json(LoginResponse {
        message: AUTHENTICATION_SUCCESS,
        token,
    }))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}
