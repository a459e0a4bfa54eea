use thiserror::Error;

use crate::domain::order::{OrderFinal, UnknownVariant};
use crate::domain::OrderStatus;
use crate::payment::PaymentError;
use crate::ports::RepositoryError;
use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("order must contain at least one item")]
    EmptyOrder,

    #[error(
        "quantity for menu {menu_id} must be between 1 and {}",
        crate::validation::ITEM_QUANTITY_MAX
    )]
    InvalidQuantity { menu_id: i64 },

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("menu {0} not found")]
    MenuNotFound(i64),

    #[error("menu '{0}' is not available")]
    MenuUnavailable(String),

    #[error("booth '{0}' is closed")]
    BoothClosed(String),

    #[error("order {0} not found")]
    OrderNotFound(String),

    #[error("invalid order status '{0}'")]
    InvalidStatus(String),

    #[error("order {code} is already {status} and can no longer change")]
    OrderFinal { code: String, status: OrderStatus },

    #[error("order {order_code} was created but its payment invoice could not be issued: {source}")]
    InvoiceIssuanceFailed {
        order_code: String,
        #[source]
        source: PaymentError,
    },

    #[error("storage failure: {0}")]
    Storage(#[from] RepositoryError),
}

impl From<OrderFinal> for OrderError {
    fn from(err: OrderFinal) -> Self {
        OrderError::OrderFinal {
            code: err.code,
            status: err.status,
        }
    }
}

impl From<UnknownVariant> for OrderError {
    fn from(err: UnknownVariant) -> Self {
        OrderError::InvalidStatus(err.value)
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("order {0} not found")]
    OrderNotFound(String),

    #[error("order {0} has no items to notify")]
    NothingToSend(String),

    #[error("messaging is not connected, could not notify booth '{booth_name}'")]
    MessagingUnavailable { booth_name: String },

    #[error("failed to notify booth '{booth_name}': {reason}")]
    MessagingSendFailed { booth_name: String, reason: String },

    #[error("storage failure: {0}")]
    Storage(#[from] RepositoryError),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("booth {0} not found")]
    BoothNotFound(i64),

    #[error("menu {0} not found")]
    MenuNotFound(i64),

    #[error("booth name '{0}' already exists")]
    BoothNameTaken(String),

    #[error("{0} is still referenced by existing orders")]
    InUse(String),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("storage failure: {0}")]
    Storage(#[from] RepositoryError),
}

#[derive(Debug, Error)]
pub enum LogError {
    #[error("invalid destination '{0}'")]
    InvalidDestination(String),

    #[error("storage failure: {0}")]
    Storage(#[from] RepositoryError),
}
