//! Domain layer: entities and pure business rules.

pub mod catalog;
pub mod notification;
pub mod order;

pub use catalog::{Booth, BoothUpdate, Menu, MenuFilter, MenuUpdate, NewBooth, NewMenu};
pub use notification::{BoothGroup, NewNotificationRecord, NotificationRecord};
pub use order::{
    GatewayPaymentStatus, NewOrder, NewOrderItem, Order, OrderItem, OrderStatus, PaymentMethod,
    PaymentStatus, StatusChange,
};
