//! Storage adapters implementing the ports over PostgreSQL.

pub mod postgres_catalog;
pub mod postgres_notification_log;
pub mod postgres_order_store;

pub use postgres_catalog::PostgresCatalog;
pub use postgres_notification_log::PostgresNotificationLog;
pub use postgres_order_store::PostgresOrderStore;
