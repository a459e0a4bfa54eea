use chrono::{DateTime, FixedOffset, NaiveTime, Offset, TimeZone, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::domain::Order;
use crate::ports::{OrderStore, RepositoryResult};

pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 7;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub since: DateTime<Utc>,
    pub total_income: i64,
    pub order_count: i64,
    pub orders: Vec<Order>,
}

pub struct Dashboard {
    orders: Arc<dyn OrderStore>,
    offset: FixedOffset,
}

impl Dashboard {
    pub fn new(orders: Arc<dyn OrderStore>, offset: FixedOffset) -> Self {
        Self { orders, offset }
    }

    pub async fn today(&self) -> RepositoryResult<DashboardSummary> {
        self.summary_since(start_of_local_day(Utc::now(), self.offset))
            .await
    }

    pub async fn summary_since(&self, since: DateTime<Utc>) -> RepositoryResult<DashboardSummary> {
        let (total_income, order_count, orders) = tokio::try_join!(
            self.orders.total_income_since(since),
            self.orders.count_orders_since(since),
            self.orders.orders_since(since),
        )?;

        Ok(DashboardSummary {
            since,
            total_income,
            order_count,
            orders,
        })
    }
}

/// Builds the business offset, falling back to UTC+7 for out-of-range hours.
pub fn business_offset(hours: i32) -> FixedOffset {
    hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .or_else(|| FixedOffset::east_opt(DEFAULT_UTC_OFFSET_HOURS * 3600))
        .unwrap_or_else(|| Utc.fix())
}

/// Midnight of the local calendar day containing `now`, as a UTC instant.
pub fn start_of_local_day(now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    let midnight = now
        .with_timezone(&offset)
        .date_naive()
        .and_time(NaiveTime::MIN);

    offset
        .from_local_datetime(&midnight)
        .single()
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or(now)
}
