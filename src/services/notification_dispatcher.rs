use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::notification::{
    group_items_by_booth, render_booth_message, LOG_STATUS_FAILED, LOG_STATUS_SENT,
    MESSAGE_TYPE_ORDER_NOTIFICATION,
};
use crate::domain::{BoothGroup, NewNotificationRecord, Order};
use crate::messaging::MessagingError;
use crate::ports::{MessagingSender, NotificationLogStore, OrderStore, RepositoryError};
use crate::services::errors::DispatchError;

pub const DEFAULT_GROUP_SEND_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSummary {
    pub order_code: String,
    pub booths_notified: Vec<String>,
}

#[derive(Debug)]
struct GroupOutcome {
    booth_name: String,
    result: Result<(), MessagingError>,
}

/// Sends each booth its share of an order over the messaging session.
pub struct NotificationDispatcher {
    orders: Arc<dyn OrderStore>,
    messaging: Arc<dyn MessagingSender>,
    logs: Arc<dyn NotificationLogStore>,
    send_timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        messaging: Arc<dyn MessagingSender>,
        logs: Arc<dyn NotificationLogStore>,
    ) -> Self {
        Self {
            orders,
            messaging,
            logs,
            send_timeout: DEFAULT_GROUP_SEND_TIMEOUT,
        }
    }

    pub fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    pub async fn send_order_notification_to_seller(
        &self,
        code: &str,
    ) -> Result<DispatchSummary, DispatchError> {
        let order = self.orders.find_order_by_code(code).await.map_err(|e| match e {
            RepositoryError::NotFound(_) => DispatchError::OrderNotFound(code.to_string()),
            other => DispatchError::Storage(other),
        })?;

        let groups = group_items_by_booth(&order.items);
        if groups.is_empty() {
            return Err(DispatchError::NothingToSend(order.order_code));
        }

        // Groups come back in booth id order, and join_all keeps that order.
        let outcomes = join_all(groups.iter().map(|group| self.dispatch_group(&order, group))).await;

        let mut booths_notified = Vec::with_capacity(outcomes.len());
        let mut first_failure = None;
        for outcome in outcomes {
            match outcome.result {
                Ok(()) => booths_notified.push(outcome.booth_name),
                Err(e) if first_failure.is_none() => first_failure = Some((outcome.booth_name, e)),
                Err(_) => {}
            }
        }

        if let Some((booth_name, error)) = first_failure {
            return Err(match error {
                MessagingError::NotConnected => DispatchError::MessagingUnavailable { booth_name },
                other => DispatchError::MessagingSendFailed {
                    booth_name,
                    reason: other.to_string(),
                },
            });
        }

        tracing::info!(
            order_code = %order.order_code,
            booths = booths_notified.len(),
            "Order notification delivered to all booths"
        );

        Ok(DispatchSummary {
            order_code: order.order_code,
            booths_notified,
        })
    }

    async fn dispatch_group(&self, order: &Order, group: &BoothGroup) -> GroupOutcome {
        let message = render_booth_message(order, group);

        let result = match tokio::time::timeout(
            self.send_timeout,
            self.messaging.send_message(&group.booth_contact, &message),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(MessagingError::SendFailed {
                attempts: 0,
                reason: format!("timed out after {:?}", self.send_timeout),
            }),
        };

        let (status, response) = match &result {
            Ok(()) => {
                tracing::info!(
                    order_code = %order.order_code,
                    booth_id = group.booth_id,
                    "Booth notified"
                );
                (LOG_STATUS_SENT, format!("Delivered to {}", group.booth_name))
            }
            Err(e) => {
                tracing::error!(
                    order_code = %order.order_code,
                    booth_id = group.booth_id,
                    booth_name = %group.booth_name,
                    "Booth notification failed: {}",
                    e
                );
                (LOG_STATUS_FAILED, e.to_string())
            }
        };

        let record = NewNotificationRecord {
            order_id: Some(order.id),
            booth_id: Some(group.booth_id),
            message_type: MESSAGE_TYPE_ORDER_NOTIFICATION.to_string(),
            status: status.to_string(),
            response,
        };
        if let Err(e) = self.logs.append(&record).await {
            tracing::warn!(
                order_code = %order.order_code,
                booth_id = group.booth_id,
                "Failed to record notification log: {}",
                e
            );
        }

        GroupOutcome {
            booth_name: group.booth_name.clone(),
            result,
        }
    }
}
