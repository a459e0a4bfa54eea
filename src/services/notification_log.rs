use std::sync::Arc;
use url::Url;

use crate::domain::notification::{LOG_STATUS_CLICKED, MESSAGE_TYPE_MANUAL_CLICK};
use crate::domain::{NewNotificationRecord, NotificationRecord};
use crate::messaging::normalize_phone;
use crate::ports::NotificationLogStore;
use crate::services::errors::LogError;
use crate::utils::pagination::{Page, PageRequest, DEFAULT_LOG_PAGE_SIZE};
use crate::utils::sanitize::mask_destination;

const WHATSAPP_CHAT_URL: &str = "https://wa.me/";

/// Audit log recorder. Entries are append-only.
pub struct NotificationLog {
    store: Arc<dyn NotificationLogStore>,
}

impl NotificationLog {
    pub fn new(store: Arc<dyn NotificationLogStore>) -> Self {
        Self { store }
    }

    /// Records a manual contact attempt and returns the chat link to follow.
    pub async fn record_log(
        &self,
        order_id: Option<i64>,
        booth_id: Option<i64>,
        destination: &str,
        text: &str,
    ) -> Result<Url, LogError> {
        let phone = normalize_phone(destination)
            .map_err(|_| LogError::InvalidDestination(destination.to_string()))?;

        let mut link = Url::parse(WHATSAPP_CHAT_URL)
            .and_then(|base| base.join(&phone))
            .map_err(|_| LogError::InvalidDestination(destination.to_string()))?;
        if !text.is_empty() {
            link.query_pairs_mut().append_pair("text", text);
        }

        let record = NewNotificationRecord {
            order_id,
            booth_id,
            message_type: MESSAGE_TYPE_MANUAL_CLICK.to_string(),
            status: LOG_STATUS_CLICKED.to_string(),
            response: format!("Redirected to {}", phone),
        };
        self.store.append(&record).await?;

        tracing::info!(
            order_id,
            booth_id,
            destination = %mask_destination(&phone),
            "Manual notification click recorded"
        );
        Ok(link)
    }

    pub async fn list_logs(
        &self,
        page: Option<i64>,
        page_size: Option<i64>,
    ) -> Result<Page<NotificationRecord>, LogError> {
        let request = PageRequest::new(page, page_size, DEFAULT_LOG_PAGE_SIZE);
        let (entries, total) = self.store.list(request).await?;
        Ok(Page::new(entries, total, request))
    }
}
