//! Order lifecycle: checkout, status transitions and payment reconciliation.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::{
    GatewayPaymentStatus, NewOrder, NewOrderItem, Order, OrderStatus, PaymentMethod, StatusChange,
};
use crate::payment::InvoiceRequest;
use crate::ports::{CatalogGateway, OrderStore, PaymentGateway, RepositoryError};
use crate::services::errors::OrderError;
use crate::utils::pagination::{Page, PageRequest, DEFAULT_ORDER_PAGE_SIZE};
use crate::validation::{
    clean_customer_name, clean_item_notes, clean_table_number, ITEM_QUANTITY_MAX,
};

const ORDER_CODE_ATTEMPTS: usize = 3;
pub const PAY_AT_COUNTER_MESSAGE: &str = "Order placed, please pay at the counter";
pub const PAY_ONLINE_MESSAGE: &str = "Order placed, continue to the payment page";

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderItem {
    pub menu_id: i64,
    pub quantity: i32,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderInput {
    pub customer_name: String,
    #[serde(default)]
    pub table_number: String,
    pub payment_method: PaymentMethod,
    pub items: Vec<CreateOrderItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateOrderOutput {
    pub order_code: String,
    pub total_amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
    pub message: String,
}

/// What a payment callback did to the referenced order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    Applied(StatusChange),
    Unchanged,
    Ignored,
}

pub struct OrderLifecycle {
    orders: Arc<dyn OrderStore>,
    catalog: Arc<dyn CatalogGateway>,
    payments: Arc<dyn PaymentGateway>,
    base_url: String,
}

impl OrderLifecycle {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        catalog: Arc<dyn CatalogGateway>,
        payments: Arc<dyn PaymentGateway>,
        base_url: String,
    ) -> Self {
        Self {
            orders,
            catalog,
            payments,
            base_url,
        }
    }

    pub async fn create_order(&self, input: CreateOrderInput) -> Result<CreateOrderOutput, OrderError> {
        if input.items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        if let Some(item) = input
            .items
            .iter()
            .find(|item| !(1..=ITEM_QUANTITY_MAX).contains(&item.quantity))
        {
            return Err(OrderError::InvalidQuantity {
                menu_id: item.menu_id,
            });
        }

        let customer_name = clean_customer_name(&input.customer_name)?;
        let table_number = clean_table_number(&input.table_number)?;

        let mut lines = Vec::with_capacity(input.items.len());
        for requested in &input.items {
            let menu = self
                .catalog
                .find_menu_by_id(requested.menu_id)
                .await
                .map_err(|e| match e {
                    RepositoryError::NotFound(_) => OrderError::MenuNotFound(requested.menu_id),
                    other => OrderError::Storage(other),
                })?;

            if !menu.is_available {
                return Err(OrderError::MenuUnavailable(menu.name));
            }
            if !menu.booth.is_active {
                return Err(OrderError::BoothClosed(menu.booth.name));
            }

            lines.push(NewOrderItem {
                menu_id: menu.id,
                booth_id: menu.booth_id,
                quantity: requested.quantity,
                price_at_purchase: menu.price,
                notes: clean_item_notes(&requested.notes)?,
                menu_name: menu.name,
                booth_name: menu.booth.name,
                booth_contact: menu.booth.contact,
            });
        }

        let mut new_order = NewOrder::new(customer_name, table_number, input.payment_method, lines);
        let order = self.insert_with_fresh_code(&mut new_order).await?;

        tracing::info!(
            order_code = %order.order_code,
            total_amount = order.total_amount,
            payment_method = %order.payment_method,
            items = order.items.len(),
            "Order created"
        );

        if !order.payment_method.requires_invoice() {
            return Ok(CreateOrderOutput {
                order_code: order.order_code,
                total_amount: order.total_amount,
                payment_url: None,
                message: PAY_AT_COUNTER_MESSAGE.to_string(),
            });
        }

        let invoice = self
            .payments
            .create_invoice(&self.invoice_request(&order))
            .await
            .map_err(|source| {
                tracing::error!(
                    order_code = %order.order_code,
                    "Invoice issuance failed, order left pending: {}",
                    source
                );
                OrderError::InvoiceIssuanceFailed {
                    order_code: order.order_code.clone(),
                    source,
                }
            })?;

        self.orders
            .update_invoice_fields(&order.order_code, &invoice.id, &invoice.invoice_url)
            .await?;

        Ok(CreateOrderOutput {
            order_code: order.order_code,
            total_amount: order.total_amount,
            payment_url: Some(invoice.invoice_url),
            message: PAY_ONLINE_MESSAGE.to_string(),
        })
    }

    async fn insert_with_fresh_code(&self, new_order: &mut NewOrder) -> Result<Order, OrderError> {
        let mut attempt = 1;
        loop {
            match self.orders.create_order(new_order).await {
                Ok(order) => return Ok(order),
                Err(RepositoryError::Conflict(detail)) if attempt < ORDER_CODE_ATTEMPTS => {
                    tracing::warn!(order_code = %new_order.order_code, "Order code collision: {}", detail);
                    new_order.order_code = crate::domain::order::generate_order_code();
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn invoice_request(&self, order: &Order) -> InvoiceRequest {
        let base_url = self.base_url.trim_end_matches('/');
        InvoiceRequest {
            external_id: order.order_code.clone(),
            amount: order.total_amount,
            description: format!(
                "Pembayaran Order {} - {}",
                order.order_code, order.customer_name
            ),
            success_redirect_url: format!("{}/order/success/{}", base_url, order.order_code),
            failure_redirect_url: format!("{}/cart", base_url),
        }
    }

    pub async fn get_order_by_code(&self, code: &str) -> Result<Order, OrderError> {
        self.orders.find_order_by_code(code).await.map_err(|e| match e {
            RepositoryError::NotFound(_) => OrderError::OrderNotFound(code.to_string()),
            other => OrderError::Storage(other),
        })
    }

    pub async fn list_orders(
        &self,
        page: Option<i64>,
        page_size: Option<i64>,
        status: Option<&str>,
    ) -> Result<Page<Order>, OrderError> {
        let request = PageRequest::new(page, page_size, DEFAULT_ORDER_PAGE_SIZE);
        let status = match status.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(raw.parse::<OrderStatus>()?),
            None => None,
        };

        let (orders, total) = self.orders.list_orders(request, status).await?;
        Ok(Page::new(orders, total, request))
    }

    /// Admin-driven transition. Returns the order as it stands afterwards.
    pub async fn update_order_status(&self, code: &str, new_status: &str) -> Result<Order, OrderError> {
        let target = new_status.trim().parse::<OrderStatus>()?;
        let mut order = self.get_order_by_code(code).await?;

        let change = order.plan_status_change(target)?;
        if !self.persist_change(&order, change).await? && change != order.current_state() {
            let current = self.get_order_by_code(code).await?;
            return Err(OrderError::OrderFinal {
                code: current.order_code,
                status: current.order_status,
            });
        }

        tracing::info!(
            order_code = %order.order_code,
            from = %order.order_status,
            to = %change.order_status,
            payment_status = %change.payment_status,
            "Order status updated"
        );

        order.order_status = change.order_status;
        order.payment_status = change.payment_status;
        Ok(order)
    }

    /// Reconciles a gateway callback. Safe under repeated delivery.
    pub async fn process_payment_callback(
        &self,
        external_reference: &str,
        status: &GatewayPaymentStatus,
    ) -> Result<CallbackOutcome, OrderError> {
        let order = self.get_order_by_code(external_reference).await?;

        let Some(change) = order.plan_payment_callback(status) else {
            tracing::debug!(
                order_code = %order.order_code,
                gateway_status = ?status,
                "Ignoring intermediate gateway status"
            );
            return Ok(CallbackOutcome::Ignored);
        };

        if !self.persist_change(&order, change).await? {
            return Ok(CallbackOutcome::Unchanged);
        }

        tracing::info!(
            order_code = %order.order_code,
            payment_status = %change.payment_status,
            order_status = %change.order_status,
            "Payment callback applied"
        );
        Ok(CallbackOutcome::Applied(change))
    }

    /// Writes only the axes that differ. Returns false when nothing changed,
    /// including when a concurrent writer finalized the order first.
    async fn persist_change(&self, order: &Order, change: StatusChange) -> Result<bool, OrderError> {
        let code = order.order_code.as_str();
        let payment_changed = change.payment_status != order.payment_status;
        let status_changed = change.order_status != order.order_status;

        match (payment_changed, status_changed) {
            (false, false) => return Ok(false),
            (true, true) => {
                let written = self
                    .orders
                    .apply_payment_result(code, change.payment_status, change.order_status)
                    .await?;
                if !written {
                    tracing::warn!(
                        order_code = %code,
                        payment_status = %change.payment_status,
                        order_status = %change.order_status,
                        "Order finalized concurrently, change dropped"
                    );
                }
                return Ok(written);
            }
            (true, false) => {
                self.orders
                    .update_payment_status(code, change.payment_status)
                    .await?
            }
            (false, true) => self.orders.update_order_status(code, change.order_status).await?,
        }

        Ok(true)
    }
}
