use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use tracing::{info, warn};

use crate::{
    models::{LoginRequest, LoginResponse},
    AppState,
};

/// Any body that does not carry the configured pair is a 401, including one
/// that is missing fields or is not JSON at all.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> (StatusCode, Json<LoginResponse>) {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Unreadable admin login body");
            LoginRequest::default()
        }
    };

    let username = payload.username.as_deref().unwrap_or_default();
    let password = payload.password.as_deref().unwrap_or_default();
    let complete = payload.username.is_some() && payload.password.is_some();

    if complete && state.admin.matches(username, password) {
        info!(username = %username, "Admin logged in");
        (StatusCode::OK, Json(LoginResponse::granted(&state.admin.token)))
    } else {
        warn!(username = %username, "Rejected admin login");
        (StatusCode::UNAUTHORIZED, Json(LoginResponse::denied()))
    }
}

/// Lets clients check that a stored token is still accepted.
pub async fn protected() -> Json<serde_json::Value> {
    Json(json!({ "message": "Protected route reached" }))
}
