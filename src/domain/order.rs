//! Order domain entity and its status rules.
//! Framework-agnostic: no persistence or HTTP concerns live here.

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const ORDER_CODE_PREFIX: &str = "ORD-";
pub const ORDER_CODE_SUFFIX_LEN: usize = 8;

/// Fulfilment pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// `completed` and `cancelled` accept no further transitions.
    pub fn is_final(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Stages that imply a cash order has been paid at the counter.
    pub fn is_fulfilment_stage(&self) -> bool {
        matches!(
            self,
            OrderStatus::Confirmed
                | OrderStatus::Preparing
                | OrderStatus::Ready
                | OrderStatus::Completed
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for OrderStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "order status",
                value: s.to_string(),
            })
    }
}

/// Money received, tracked independently of fulfilment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Expired,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "expired" => Ok(PaymentStatus::Expired),
            _ => Err(UnknownVariant {
                kind: "payment status",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Qris,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Qris => "qris",
        }
    }

    /// Every method except cash is settled through a hosted invoice.
    pub fn requires_invoice(&self) -> bool {
        !matches!(self, PaymentMethod::Cash)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "qris" => Ok(PaymentMethod::Qris),
            _ => Err(UnknownVariant {
                kind: "payment method",
                value: s.to_string(),
            }),
        }
    }
}

/// Status reported by the payment gateway in its callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayPaymentStatus {
    Paid,
    Settled,
    Expired,
    Other(String),
}

impl From<&str> for GatewayPaymentStatus {
    fn from(value: &str) -> Self {
        match value.trim() {
            "PAID" => GatewayPaymentStatus::Paid,
            "SETTLED" => GatewayPaymentStatus::Settled,
            "EXPIRED" => GatewayPaymentStatus::Expired,
            other => GatewayPaymentStatus::Other(other.to_string()),
        }
    }
}

/// A priced line within an order. The booth is the one the menu belonged to
/// at checkout; names and contact reflect current rows. Pricing is frozen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub menu_id: i64,
    pub booth_id: i64,
    pub quantity: i32,
    pub price_at_purchase: i64,
    pub notes: String,
    pub menu_name: String,
    pub booth_name: String,
    pub booth_contact: String,
}

impl OrderItem {
    pub fn subtotal(&self) -> i64 {
        i64::from(self.quantity).saturating_mul(self.price_at_purchase)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_code: String,
    pub customer_name: String,
    pub table_number: String,
    pub total_amount: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    pub invoice_id: Option<String>,
    pub invoice_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

/// Target state for both status axes, applied as one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("order {code} is already {status} and can no longer change")]
pub struct OrderFinal {
    pub code: String,
    pub status: OrderStatus,
}

impl Order {
    pub fn is_final(&self) -> bool {
        self.order_status.is_final()
    }

    pub fn items_total(&self) -> i64 {
        self.items
            .iter()
            .map(OrderItem::subtotal)
            .fold(0, i64::saturating_add)
    }

    pub fn current_state(&self) -> StatusChange {
        StatusChange {
            payment_status: self.payment_status,
            order_status: self.order_status,
        }
    }

    /// Plans an admin-driven transition to `target`.
    ///
    /// Cancelling always expires the payment. For cash orders the payment
    /// status mirrors fulfilment: any active stage means paid, going back to
    /// pending means unpaid. Gateway-settled orders keep their payment status.
    pub fn plan_status_change(&self, target: OrderStatus) -> Result<StatusChange, OrderFinal> {
        if self.is_final() {
            return Err(OrderFinal {
                code: self.order_code.clone(),
                status: self.order_status,
            });
        }

        let payment_status = if target == OrderStatus::Cancelled {
            PaymentStatus::Expired
        } else if self.payment_method == PaymentMethod::Cash {
            if target.is_fulfilment_stage() {
                PaymentStatus::Paid
            } else {
                PaymentStatus::Pending
            }
        } else {
            self.payment_status
        };

        Ok(StatusChange {
            payment_status,
            order_status: target,
        })
    }

    /// Plans the reconciliation for a gateway callback. `None` means the
    /// status is an intermediate one that is ignored.
    ///
    /// Applying the result a second time yields the same state, so duplicate
    /// deliveries are harmless. EXPIRED is a no-op once the order is paid or
    /// final, and an order already past `pending` is not pulled back to
    /// `confirmed`.
    pub fn plan_payment_callback(&self, status: &GatewayPaymentStatus) -> Option<StatusChange> {
        match status {
            GatewayPaymentStatus::Paid | GatewayPaymentStatus::Settled => Some(StatusChange {
                payment_status: PaymentStatus::Paid,
                order_status: if self.order_status == OrderStatus::Pending {
                    OrderStatus::Confirmed
                } else {
                    self.order_status
                },
            }),
            GatewayPaymentStatus::Expired
                if self.payment_status == PaymentStatus::Paid || self.is_final() =>
            {
                Some(self.current_state())
            }
            GatewayPaymentStatus::Expired => Some(StatusChange {
                payment_status: PaymentStatus::Expired,
                order_status: OrderStatus::Cancelled,
            }),
            GatewayPaymentStatus::Other(_) => None,
        }
    }
}

/// A line ready to be persisted, priced from the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItem {
    pub menu_id: i64,
    pub booth_id: i64,
    pub quantity: i32,
    pub price_at_purchase: i64,
    pub notes: String,
    pub menu_name: String,
    pub booth_name: String,
    pub booth_contact: String,
}

impl NewOrderItem {
    pub fn subtotal(&self) -> i64 {
        i64::from(self.quantity).saturating_mul(self.price_at_purchase)
    }
}

/// An order about to be inserted. Always starts pending on both axes.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub order_code: String,
    pub customer_name: String,
    pub table_number: String,
    pub payment_method: PaymentMethod,
    pub items: Vec<NewOrderItem>,
}

impl NewOrder {
    pub fn new(
        customer_name: String,
        table_number: String,
        payment_method: PaymentMethod,
        items: Vec<NewOrderItem>,
    ) -> Self {
        Self {
            order_code: generate_order_code(),
            customer_name,
            table_number,
            payment_method,
            items,
        }
    }

    pub fn total_amount(&self) -> i64 {
        self.items
            .iter()
            .map(NewOrderItem::subtotal)
            .fold(0, i64::saturating_add)
    }
}

pub fn generate_order_code() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ORDER_CODE_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("{}{}", ORDER_CODE_PREFIX, suffix)
}
