use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::GatewayPaymentStatus;
use crate::error::AppError;
use crate::services::{CallbackOutcome, OrderError};
use crate::AppState;

pub use crate::middleware::auth::CALLBACK_TOKEN_HEADER;

/// Invoice callback body. Only `external_id` and `status` drive reconciliation.
#[derive(Debug, Deserialize, Serialize)]
pub struct XenditCallback {
    #[serde(default)]
    pub id: Option<String>,
    pub external_id: String,
    pub status: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub paid_amount: Option<f64>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

/// Answers 200 for anything that should not be redelivered, including
/// callbacks for unknown orders. Only storage failures return 5xx. The
/// callback token is checked by `callback_auth` before the body is read.
pub async fn xendit_callback(
    State(state): State<AppState>,
    Json(payload): Json<XenditCallback>,
) -> Result<impl IntoResponse, AppError> {
    if payload.external_id.trim().is_empty() {
        return Err(AppError::BadRequest("external_id is required".to_string()));
    }

    tracing::info!(
        external_id = %payload.external_id,
        status = %payload.status,
        paid_amount = ?payload.paid_amount,
        "Payment callback received"
    );

    let status = GatewayPaymentStatus::from(payload.status.as_str());
    let message = match state
        .orders
        .process_payment_callback(&payload.external_id, &status)
        .await
    {
        Ok(CallbackOutcome::Applied(_)) => "processed",
        Ok(CallbackOutcome::Unchanged) => "already processed",
        Ok(CallbackOutcome::Ignored) => "ignored",
        Err(OrderError::OrderNotFound(code)) => {
            tracing::warn!(external_id = %code, "Payment callback for unknown order");
            "ignored"
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Json(json!({ "message": message })))
}
