use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::ports::RepositoryError;
use crate::services::{CatalogError, DispatchError, LogError, OrderError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{}", self);
        }

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        let message = err.to_string();
        match err {
            OrderError::EmptyOrder
            | OrderError::InvalidQuantity { .. }
            | OrderError::Validation(_)
            | OrderError::InvalidStatus(_) => AppError::Validation(message),
            OrderError::MenuNotFound(_) | OrderError::OrderNotFound(_) => AppError::NotFound(message),
            OrderError::MenuUnavailable(_)
            | OrderError::BoothClosed(_)
            | OrderError::OrderFinal { .. } => AppError::Conflict(message),
            OrderError::InvoiceIssuanceFailed { .. } => AppError::Upstream(message),
            OrderError::Storage(e) => AppError::Database(e),
        }
    }
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        let message = err.to_string();
        match err {
            DispatchError::OrderNotFound(_) => AppError::NotFound(message),
            DispatchError::NothingToSend(_) => AppError::Validation(message),
            DispatchError::MessagingUnavailable { .. } => AppError::Unavailable(message),
            DispatchError::MessagingSendFailed { .. } => AppError::Upstream(message),
            DispatchError::Storage(e) => AppError::Database(e),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        let message = err.to_string();
        match err {
            CatalogError::BoothNotFound(_) | CatalogError::MenuNotFound(_) => {
                AppError::NotFound(message)
            }
            CatalogError::BoothNameTaken(_) | CatalogError::InUse(_) => AppError::Conflict(message),
            CatalogError::Validation(_) => AppError::Validation(message),
            CatalogError::Storage(e) => AppError::Database(e),
        }
    }
}

impl From<LogError> for AppError {
    fn from(err: LogError) -> Self {
        match err {
            LogError::InvalidDestination(_) => AppError::BadRequest(err.to_string()),
            LogError::Storage(e) => AppError::Database(e),
        }
    }
}
