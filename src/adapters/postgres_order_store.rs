//! Postgres implementation of OrderStore.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use std::str::FromStr;

use crate::domain::{NewOrder, Order, OrderItem, OrderStatus, PaymentStatus};
use crate::ports::{OrderStore, RepositoryError, RepositoryResult};
use crate::utils::pagination::PageRequest;

const ORDER_COLUMNS: &str = "id, order_code, customer_name, table_number, total_amount, \
     payment_method, payment_status, order_status, invoice_id, invoice_url, created_at, updated_at";

#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads items for the given orders. The booth is the one recorded at
    /// checkout; names and contact come from the current rows.
    async fn load_items(&self, order_ids: &[i64]) -> RepositoryResult<HashMap<i64, Vec<OrderItem>>> {
        if order_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, OrderItemRow>(
            r#"
            SELECT oi.id, oi.order_id, oi.menu_id, oi.booth_id, oi.quantity, oi.price_at_purchase,
                   oi.notes, m.name AS menu_name, b.name AS booth_name, b.contact AS booth_contact
            FROM order_items oi
            JOIN menus m ON m.id = oi.menu_id
            JOIN booths b ON b.id = oi.booth_id
            WHERE oi.order_id = ANY($1)
            ORDER BY oi.order_id, oi.id
            "#,
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        let mut items: HashMap<i64, Vec<OrderItem>> = HashMap::new();
        for row in rows {
            let order_id = row.order_id;
            items.entry(order_id).or_default().push(row.into_domain());
        }
        Ok(items)
    }

    async fn with_items(&self, rows: Vec<OrderRow>) -> RepositoryResult<Vec<Order>> {
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut items = self.load_items(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let order_items = items.remove(&row.id).unwrap_or_default();
                row.into_domain(order_items)
            })
            .collect()
    }

    async fn update_column(&self, code: &str, column: &str, value: &str) -> RepositoryResult<()> {
        let sql = format!(
            "UPDATE orders SET {} = $2, updated_at = NOW() WHERE order_code = $1",
            column
        );
        let result = sqlx::query(&sql)
            .bind(code)
            .bind(value)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(code.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn create_order(&self, order: &NewOrder) -> RepositoryResult<Order> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            INSERT INTO orders (order_code, customer_name, table_number, total_amount, payment_method)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(&order.order_code)
        .bind(&order.customer_name)
        .bind(&order.table_number)
        .bind(order.total_amount())
        .bind(order.payment_method.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(RepositoryError::from)?;

        let mut items = Vec::with_capacity(order.items.len());
        for item in &order.items {
            let id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO order_items (order_id, menu_id, booth_id, quantity, price_at_purchase, notes)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id
                "#,
            )
            .bind(row.id)
            .bind(item.menu_id)
            .bind(item.booth_id)
            .bind(item.quantity)
            .bind(item.price_at_purchase)
            .bind(&item.notes)
            .fetch_one(&mut *tx)
            .await
            .map_err(RepositoryError::from)?;

            items.push(OrderItem {
                id,
                menu_id: item.menu_id,
                booth_id: item.booth_id,
                quantity: item.quantity,
                price_at_purchase: item.price_at_purchase,
                notes: item.notes.clone(),
                menu_name: item.menu_name.clone(),
                booth_name: item.booth_name.clone(),
                booth_contact: item.booth_contact.clone(),
            });
        }

        tx.commit().await.map_err(RepositoryError::from)?;

        row.into_domain(items)
    }

    async fn find_order_by_code(&self, code: &str) -> RepositoryResult<Order> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE order_code = $1",
            ORDER_COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?
        .ok_or_else(|| RepositoryError::NotFound(code.to_string()))?;

        let mut items = self.load_items(&[row.id]).await?;
        let order_items = items.remove(&row.id).unwrap_or_default();
        row.into_domain(order_items)
    }

    async fn update_invoice_fields(
        &self,
        code: &str,
        invoice_id: &str,
        invoice_url: &str,
    ) -> RepositoryResult<()> {
        let result = sqlx::query(
            "UPDATE orders SET invoice_id = $2, invoice_url = $3, updated_at = NOW() WHERE order_code = $1",
        )
        .bind(code)
        .bind(invoice_id)
        .bind(invoice_url)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(code.to_string()));
        }
        Ok(())
    }

    async fn update_payment_status(&self, code: &str, status: PaymentStatus) -> RepositoryResult<()> {
        self.update_column(code, "payment_status", status.as_str()).await
    }

    async fn update_order_status(&self, code: &str, status: OrderStatus) -> RepositoryResult<()> {
        self.update_column(code, "order_status", status.as_str()).await
    }

    async fn apply_payment_result(
        &self,
        code: &str,
        payment_status: PaymentStatus,
        order_status: OrderStatus,
    ) -> RepositoryResult<bool> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let (id, current): (i64, String) = sqlx::query_as(
            "SELECT id, order_status FROM orders WHERE order_code = $1 FOR UPDATE",
        )
        .bind(code)
        .fetch_optional(&mut *tx)
        .await
        .map_err(RepositoryError::from)?
        .ok_or_else(|| RepositoryError::NotFound(code.to_string()))?;

        if parse_column::<OrderStatus>("order_status", &current)?.is_final() {
            tx.rollback().await.map_err(RepositoryError::from)?;
            return Ok(false);
        }

        sqlx::query(
            "UPDATE orders SET payment_status = $2, order_status = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(payment_status.as_str())
        .bind(order_status.as_str())
        .execute(&mut *tx)
        .await
        .map_err(RepositoryError::from)?;

        tx.commit().await.map_err(RepositoryError::from)?;
        Ok(true)
    }

    async fn list_orders(
        &self,
        page: PageRequest,
        status: Option<OrderStatus>,
    ) -> RepositoryResult<(Vec<Order>, i64)> {
        let status = status.map(|s| s.as_str());

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE ($1::TEXT IS NULL OR order_status = $1)",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            SELECT {} FROM orders
            WHERE ($1::TEXT IS NULL OR order_status = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
            ORDER_COLUMNS
        ))
        .bind(status)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok((self.with_items(rows).await?, total))
    }

    async fn total_income_since(&self, since: DateTime<Utc>) -> RepositoryResult<i64> {
        sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_amount), 0)::BIGINT FROM orders WHERE payment_status = 'paid' AND created_at >= $1",
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::from)
    }

    async fn count_orders_since(&self, since: DateTime<Utc>) -> RepositoryResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE created_at >= $1")
            .bind(since)
            .fetch_one(&self.pool)
            .await
            .map_err(RepositoryError::from)
    }

    async fn orders_since(&self, since: DateTime<Utc>) -> RepositoryResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE created_at >= $1 ORDER BY created_at DESC, id DESC",
            ORDER_COLUMNS
        ))
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        self.with_items(rows).await
    }
}

fn parse_column<T: FromStr>(column: &str, value: &str) -> RepositoryResult<T> {
    value
        .parse()
        .map_err(|_| RepositoryError::Database(format!("unexpected {} value '{}'", column, value)))
}

/// Internal row types for SQLx. Not exposed outside the adapter.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    order_code: String,
    customer_name: String,
    table_number: String,
    total_amount: i64,
    payment_method: String,
    payment_status: String,
    order_status: String,
    invoice_id: Option<String>,
    invoice_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_domain(self, items: Vec<OrderItem>) -> RepositoryResult<Order> {
        Ok(Order {
            id: self.id,
            payment_method: parse_column("payment_method", &self.payment_method)?,
            payment_status: parse_column("payment_status", &self.payment_status)?,
            order_status: parse_column("order_status", &self.order_status)?,
            order_code: self.order_code,
            customer_name: self.customer_name,
            table_number: self.table_number,
            total_amount: self.total_amount,
            invoice_id: self.invoice_id,
            invoice_url: self.invoice_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
            items,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i64,
    order_id: i64,
    menu_id: i64,
    booth_id: i64,
    quantity: i32,
    price_at_purchase: i64,
    notes: String,
    menu_name: String,
    booth_name: String,
    booth_contact: String,
}

impl OrderItemRow {
    fn into_domain(self) -> OrderItem {
        OrderItem {
            id: self.id,
            menu_id: self.menu_id,
            booth_id: self.booth_id,
            quantity: self.quantity,
            price_at_purchase: self.price_at_purchase,
            notes: self.notes,
            menu_name: self.menu_name,
            booth_name: self.booth_name,
            booth_contact: self.booth_contact,
        }
    }
}
