use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

pub async fn dashboard(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let summary = state.dashboard.today().await?;
    Ok(Json(summary))
}

pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = state
        .orders
        .list_orders(query.page, query.page_size, query.status.as_deref())
        .await?;
    Ok(Json(page))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let order = state.orders.get_order_by_code(&code).await?;
    Ok(Json(order))
}

pub async fn update_order_status(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(body): Json<StatusUpdate>,
) -> Result<impl IntoResponse, AppError> {
    let order = state.orders.update_order_status(&code, &body.status).await?;
    Ok(Json(order))
}

/// Sends each booth its part of the order. Safe to call again after a
/// partial failure, at the cost of duplicate messages to booths that
/// already received theirs.
pub async fn notify_sellers(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let summary = state.dispatcher.send_order_notification_to_seller(&code).await?;
    Ok(Json(json!({
        "message": "Notification sent",
        "order_code": summary.order_code,
        "booths_notified": summary.booths_notified,
    })))
}
