use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::domain::{BoothUpdate, MenuFilter, MenuUpdate, NewBooth, NewMenu};
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct BoothListQuery {
    #[serde(default)]
    pub active_only: Option<bool>,
}

/// Storefront listing: only available menus of active booths.
pub async fn list_menus(
    State(state): State<AppState>,
    Query(mut filter): Query<MenuFilter>,
) -> Result<impl IntoResponse, AppError> {
    filter.include_unavailable = false;
    let menus = state.catalog.list_menus(&filter).await?;
    Ok(Json(menus))
}

pub async fn get_menu(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let menu = state.catalog.get_menu(id).await?;
    Ok(Json(menu))
}

pub async fn list_booths(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let booths = state.catalog.list_booths(true).await?;
    Ok(Json(booths))
}

pub async fn admin_list_menus(
    State(state): State<AppState>,
    Query(filter): Query<MenuFilter>,
) -> Result<impl IntoResponse, AppError> {
    let menus = state.catalog.list_menus(&filter).await?;
    Ok(Json(menus))
}

pub async fn admin_list_booths(
    State(state): State<AppState>,
    Query(query): Query<BoothListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let booths = state
        .catalog
        .list_booths(query.active_only.unwrap_or(false))
        .await?;
    Ok(Json(booths))
}

pub async fn create_booth(
    State(state): State<AppState>,
    Json(input): Json<NewBooth>,
) -> Result<impl IntoResponse, AppError> {
    let booth = state.catalog.create_booth(input).await?;
    Ok((StatusCode::CREATED, Json(booth)))
}

pub async fn update_booth(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<BoothUpdate>,
) -> Result<impl IntoResponse, AppError> {
    let booth = state.catalog.update_booth(id, input).await?;
    Ok(Json(booth))
}

pub async fn delete_booth(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.catalog.delete_booth(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_menu(
    State(state): State<AppState>,
    Json(input): Json<NewMenu>,
) -> Result<impl IntoResponse, AppError> {
    let menu = state.catalog.create_menu(input).await?;
    Ok((StatusCode::CREATED, Json(menu)))
}

pub async fn update_menu(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<MenuUpdate>,
) -> Result<impl IntoResponse, AppError> {
    let menu = state.catalog.update_menu(id, input).await?;
    Ok(Json(menu))
}

pub async fn delete_menu(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.catalog.delete_menu(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
