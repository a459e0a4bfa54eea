use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{NewNotificationRecord, NotificationRecord};
use crate::ports::{NotificationLogStore, RepositoryError, RepositoryResult};
use crate::utils::pagination::PageRequest;

#[derive(Clone)]
pub struct PostgresNotificationLog {
    pool: PgPool,
}

impl PostgresNotificationLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationLogStore for PostgresNotificationLog {
    async fn append(&self, record: &NewNotificationRecord) -> RepositoryResult<NotificationRecord> {
        let row = sqlx::query_as::<_, NotificationRow>(
            r#"
            INSERT INTO notification_logs (order_id, booth_id, message_type, status, response)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, order_id, booth_id, message_type, status, response, sent_at
            "#,
        )
        .bind(record.order_id)
        .bind(record.booth_id)
        .bind(&record.message_type)
        .bind(&record.status)
        .bind(&record.response)
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(row.into_domain())
    }

    async fn list(&self, page: PageRequest) -> RepositoryResult<(Vec<NotificationRecord>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notification_logs")
            .fetch_one(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, order_id, booth_id, message_type, status, response, sent_at
            FROM notification_logs
            ORDER BY sent_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok((rows.into_iter().map(NotificationRow::into_domain).collect(), total))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: i64,
    order_id: Option<i64>,
    booth_id: Option<i64>,
    message_type: String,
    status: String,
    response: String,
    sent_at: DateTime<Utc>,
}

impl NotificationRow {
    fn into_domain(self) -> NotificationRecord {
        NotificationRecord {
            id: self.id,
            order_id: self.order_id,
            booth_id: self.booth_id,
            message_type: self.message_type,
            status: self.status,
            response: self.response,
            sent_at: self.sent_at,
        }
    }
}
