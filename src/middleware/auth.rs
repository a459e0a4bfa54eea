use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::AppState;

/// Requires `Authorization: Bearer <ADMIN_API_TOKEN>`. With no token
/// configured every request is refused.
pub async fn admin_auth(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.settings.admin_api_token.as_deref() else {
        return Err(AppError::Unauthorized("admin API is disabled".to_string()));
    };

    let provided = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim);

    let verdict = match provided {
        Some(token) if tokens_match(token, expected) => Ok(()),
        Some(_) => Err("invalid admin token"),
        None => Err("missing bearer token"),
    };

    match verdict {
        Ok(()) => Ok(next.run(req).await),
        Err(reason) => {
            tracing::warn!(uri = %req.uri(), reason, "Rejected admin request");
            Err(AppError::Unauthorized(reason.to_string()))
        }
    }
}

pub const CALLBACK_TOKEN_HEADER: &str = "x-callback-token";

/// Checks the gateway's `x-callback-token` before the body is extracted.
/// With no token configured callbacks pass unauthenticated.
pub async fn callback_auth(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.settings.callback_token.as_deref() else {
        return Ok(next.run(req).await);
    };

    let provided = req
        .headers()
        .get(CALLBACK_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();

    if !tokens_match(provided, expected) {
        tracing::warn!(uri = %req.uri(), "Rejected webhook with invalid callback token");
        return Err(AppError::Unauthorized("invalid callback token".to_string()));
    }
    Ok(next.run(req).await)
}

/// Compares without short-circuiting on the first differing byte.
pub fn tokens_match(provided: &str, expected: &str) -> bool {
    let (a, b) = (provided.as_bytes(), expected.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
