//! Interfaces the services depend on. Adapters in `crate::adapters`,
//! `crate::payment` and `crate::messaging` implement them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{
    Booth, BoothUpdate, Menu, MenuFilter, MenuUpdate, NewBooth, NewMenu, NewNotificationRecord,
    NewOrder, NotificationRecord, Order, OrderStatus, PaymentStatus,
};
use crate::messaging::MessagingError;
use crate::payment::{Invoice, InvoiceRequest, PaymentError};
use crate::utils::pagination::PageRequest;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound("row".to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() || db.is_foreign_key_violation() => {
                RepositoryError::Conflict(db.message().to_string())
            }
            other => RepositoryError::Database(other.to_string()),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts the order and all of its items atomically.
    async fn create_order(&self, order: &NewOrder) -> RepositoryResult<Order>;

    /// Loads an order with items joined to current menu/booth display data.
    async fn find_order_by_code(&self, code: &str) -> RepositoryResult<Order>;

    async fn update_invoice_fields(
        &self,
        code: &str,
        invoice_id: &str,
        invoice_url: &str,
    ) -> RepositoryResult<()>;

    async fn update_payment_status(&self, code: &str, status: PaymentStatus) -> RepositoryResult<()>;

    async fn update_order_status(&self, code: &str, status: OrderStatus) -> RepositoryResult<()>;

    /// Writes both status axes in a single atomic step. Returns false without
    /// writing when the locked row is already `completed` or `cancelled`.
    async fn apply_payment_result(
        &self,
        code: &str,
        payment_status: PaymentStatus,
        order_status: OrderStatus,
    ) -> RepositoryResult<bool>;

    /// Newest first. Returns the page and the total matching count.
    async fn list_orders(
        &self,
        page: PageRequest,
        status: Option<OrderStatus>,
    ) -> RepositoryResult<(Vec<Order>, i64)>;

    /// Sum of totals of paid orders created at or after `since`.
    async fn total_income_since(&self, since: DateTime<Utc>) -> RepositoryResult<i64>;

    async fn count_orders_since(&self, since: DateTime<Utc>) -> RepositoryResult<i64>;

    async fn orders_since(&self, since: DateTime<Utc>) -> RepositoryResult<Vec<Order>>;
}

/// Read access the order core needs from the catalog.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    async fn find_menu_by_id(&self, id: i64) -> RepositoryResult<Menu>;
}

/// Full catalog management used by the back office.
#[async_trait]
pub trait CatalogRepository: CatalogGateway {
    async fn list_menus(&self, filter: &MenuFilter) -> RepositoryResult<Vec<Menu>>;
    async fn list_booths(&self, active_only: bool) -> RepositoryResult<Vec<Booth>>;
    async fn find_booth_by_id(&self, id: i64) -> RepositoryResult<Booth>;
    /// Case-insensitive exact match.
    async fn find_booth_by_name(&self, name: &str) -> RepositoryResult<Option<Booth>>;
    async fn create_booth(&self, booth: &NewBooth) -> RepositoryResult<Booth>;
    async fn update_booth(&self, id: i64, update: &BoothUpdate) -> RepositoryResult<Booth>;
    async fn delete_booth(&self, id: i64) -> RepositoryResult<()>;
    async fn create_menu(&self, menu: &NewMenu) -> RepositoryResult<Menu>;
    async fn update_menu(&self, id: i64, update: &MenuUpdate) -> RepositoryResult<Menu>;
    async fn delete_menu(&self, id: i64) -> RepositoryResult<()>;
}

/// Append-only audit log of outbound notifications.
#[async_trait]
pub trait NotificationLogStore: Send + Sync {
    async fn append(&self, record: &NewNotificationRecord) -> RepositoryResult<NotificationRecord>;

    /// Newest first. Returns the page and the total count.
    async fn list(&self, page: PageRequest) -> RepositoryResult<(Vec<NotificationRecord>, i64)>;
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_invoice(&self, request: &InvoiceRequest) -> Result<Invoice, PaymentError>;
}

/// Outbound text messaging over a single long-lived session.
#[async_trait]
pub trait MessagingSender: Send + Sync {
    fn is_connected(&self) -> bool;

    /// Retries transient failures internally before giving up.
    async fn send_message(&self, destination: &str, text: &str) -> Result<(), MessagingError>;
}
