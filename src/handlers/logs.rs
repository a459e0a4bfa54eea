use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect},
    Json,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LogListQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct TrackQuery {
    pub order_id: Option<i64>,
    pub booth_id: Option<i64>,
    pub phone: String,
    #[serde(default)]
    pub text: String,
}

pub async fn list_logs(
    State(state): State<AppState>,
    Query(query): Query<LogListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = state
        .notification_log
        .list_logs(query.page, query.page_size)
        .await?;
    Ok(Json(page))
}

/// Records a manual contact click, then sends the admin on to the chat.
pub async fn track_click(
    State(state): State<AppState>,
    Query(query): Query<TrackQuery>,
) -> Result<impl IntoResponse, AppError> {
    let link = state
        .notification_log
        .record_log(query.order_id, query.booth_id, &query.phone, &query.text)
        .await?;
    Ok(Redirect::temporary(link.as_str()))
}
