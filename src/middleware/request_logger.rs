use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Instant;
use uuid::Uuid;

use crate::utils::sanitize::sanitize_json;

const MAX_BODY_LOG_SIZE: usize = 16 * 1024;
pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLogConfig {
    pub log_body: bool,
}

/// Tags every request with an id, logs it with its latency, and echoes the
/// id back. Bodies are only logged when enabled, with sensitive keys masked.
pub async fn request_logger_middleware(
    State(config): State<RequestLogConfig>,
    mut req: Request,
    next: Next,
) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let id_header = HeaderValue::from_str(&request_id).ok();
    if let Some(value) = &id_header {
        req.headers_mut().insert(REQUEST_ID_HEADER, value.clone());
    }

    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let logged_body = if config.log_body {
        match capture_body(req).await {
            Some((restored, summary)) => {
                req = restored;
                Some(summary)
            }
            None => {
                tracing::warn!(%request_id, %method, %path, "Request body exceeds log limit");
                return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
            }
        }
    } else {
        None
    };

    tracing::info!(
        %request_id,
        %method,
        %path,
        body = logged_body.as_deref().unwrap_or(""),
        "Request received"
    );

    let mut response = next.run(req).await;

    tracing::info!(
        %request_id,
        %method,
        %path,
        status = response.status().as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        "Request finished"
    );

    if let Some(value) = id_header {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Buffers the body for logging and hands back an equivalent request.
/// `None` when the body is over the log limit.
async fn capture_body(req: Request) -> Option<(Request, String)> {
    let (parts, body) = req.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_BODY_LOG_SIZE).await.ok()?;

    let summary = match serde_json::from_slice::<serde_json::Value>(&bytes) {
        Ok(json) => sanitize_json(&json).to_string(),
        Err(_) if bytes.is_empty() => String::new(),
        Err(_) => format!("<{} bytes, not json>", bytes.len()),
    };

    Some((Request::from_parts(parts, Body::from(bytes)), summary))
}
