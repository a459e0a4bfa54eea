pub mod catalog;
pub mod dashboard;
pub mod errors;
pub mod notification_dispatcher;
pub mod notification_log;
pub mod order_lifecycle;

pub use catalog::CatalogService;
pub use dashboard::{Dashboard, DashboardSummary};
pub use errors::{CatalogError, DispatchError, LogError, OrderError};
pub use notification_dispatcher::{DispatchSummary, NotificationDispatcher};
pub use notification_log::NotificationLog;
pub use order_lifecycle::{
    CallbackOutcome, CreateOrderInput, CreateOrderItem, CreateOrderOutput, OrderLifecycle,
};
