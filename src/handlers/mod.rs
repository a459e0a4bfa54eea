pub mod admin;
pub mod catalog;
pub mod logs;
pub mod orders;
pub mod webhook;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::health::check_health;
use crate::AppState;

/// Dependency health. Returns 503 only when a critical dependency is down.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let response = check_health(&state.health_checkers, state.start_time).await;

    let status_code = if response.status == "unhealthy" {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (status_code, Json(response))
}
