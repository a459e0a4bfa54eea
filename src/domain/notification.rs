//! Seller notification grouping, message rendering and audit records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write;

use super::order::{Order, OrderItem, PaymentStatus};

pub const MESSAGE_TYPE_ORDER_NOTIFICATION: &str = "order_notification";
pub const MESSAGE_TYPE_MANUAL_CLICK: &str = "manual_click";

pub const LOG_STATUS_SENT: &str = "sent";
pub const LOG_STATUS_FAILED: &str = "failed";
pub const LOG_STATUS_CLICKED: &str = "clicked";

pub const PAID_LABEL: &str = "SUDAH LUNAS ✅";
pub const UNPAID_LABEL: &str = "BELUM LUNAS ❌";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedItem {
    pub menu_name: String,
    pub quantity: i32,
    pub notes: String,
}

/// The slice of an order that one booth has to prepare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoothGroup {
    pub booth_id: i64,
    pub booth_name: String,
    pub booth_contact: String,
    pub items: Vec<GroupedItem>,
}

/// Groups items by owning booth, ordered by booth id. Item order inside a
/// group follows the order lines.
pub fn group_items_by_booth(items: &[OrderItem]) -> Vec<BoothGroup> {
    let mut groups: BTreeMap<i64, BoothGroup> = BTreeMap::new();

    for item in items {
        groups
            .entry(item.booth_id)
            .or_insert_with(|| BoothGroup {
                booth_id: item.booth_id,
                booth_name: item.booth_name.clone(),
                booth_contact: item.booth_contact.clone(),
                items: Vec::new(),
            })
            .items
            .push(GroupedItem {
                menu_name: item.menu_name.clone(),
                quantity: item.quantity,
                notes: item.notes.clone(),
            });
    }

    groups.into_values().collect()
}

pub fn payment_label(status: PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Paid => PAID_LABEL,
        _ => UNPAID_LABEL,
    }
}

pub fn render_booth_message(order: &Order, group: &BoothGroup) -> String {
    let mut msg = format!(
        "*PESANAN MASUK!* 🔔\nKepada: *{}*\n\nOrder: *{}*\nMeja: *{}*\nPemesan: *{}*\nStatus: *{}*\n\n🍽️ *MENU:*\n",
        group.booth_name,
        order.order_code,
        order.table_number,
        order.customer_name,
        payment_label(order.payment_status),
    );

    for item in &group.items {
        let _ = write!(msg, "▪️ {}x {}", item.quantity, item.menu_name);
        if !item.notes.trim().is_empty() {
            let _ = write!(msg, " _({})_", item.notes.trim());
        }
        msg.push('\n');
    }

    msg.push_str("\nMohon segera diproses. Terima kasih! 🙏");
    msg
}

/// Append-only audit entry for an outbound notification or a tracked click.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: i64,
    pub order_id: Option<i64>,
    pub booth_id: Option<i64>,
    pub message_type: String,
    pub status: String,
    pub response: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewNotificationRecord {
    pub order_id: Option<i64>,
    pub booth_id: Option<i64>,
    pub message_type: String,
    pub status: String,
    pub response: String,
}
