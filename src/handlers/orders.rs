use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::error::AppError;
use crate::services::CreateOrderInput;
use crate::AppState;

/// Checkout. Returns the order code and, for online payment, the hosted
/// invoice URL to redirect the customer to.
pub async fn create_order(
    State(state): State<AppState>,
    Json(input): Json<CreateOrderInput>,
) -> Result<impl IntoResponse, AppError> {
    let output = state.orders.create_order(input).await?;
    Ok((StatusCode::CREATED, Json(output)))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let order = state.orders.get_order_by_code(&code).await?;
    Ok(Json(order))
}
