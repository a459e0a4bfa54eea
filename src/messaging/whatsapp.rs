use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::{normalize_phone, MessagingError};
use crate::ports::MessagingSender;
use crate::utils::sanitize::mask_destination;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub attempt_timeout: Duration,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            attempt_timeout: Duration::from_secs(30),
            delay: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    connected: bool,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    phone: &'a str,
    message: &'a str,
}

/// Client for a WhatsApp HTTP gateway holding the single logged-in session.
///
/// The connection flag is shared by every clone; it is set by `connect` and
/// kept fresh by the background health check.
#[derive(Clone)]
pub struct WhatsAppSender {
    client: Client,
    base_url: String,
    token: Option<String>,
    connected: Arc<AtomicBool>,
    retry: RetryPolicy,
}

impl WhatsAppSender {
    pub fn new(base_url: String, token: Option<String>) -> Self {
        Self::with_retry_policy(base_url, token, RetryPolicy::default())
    }

    pub fn with_retry_policy(base_url: String, token: Option<String>, retry: RetryPolicy) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url,
            token,
            connected: Arc::new(AtomicBool::new(false)),
            retry,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Checks the gateway session and records the result.
    pub async fn connect(&self) -> Result<(), MessagingError> {
        if self.refresh_connection().await {
            tracing::info!("WhatsApp gateway session connected");
            Ok(())
        } else {
            tracing::warn!("WhatsApp gateway session is not connected");
            Err(MessagingError::NotConnected)
        }
    }

    pub async fn refresh_connection(&self) -> bool {
        let request = self.authorized(self.client.get(self.url("/status")));
        let connected = match request.send().await {
            Ok(response) if response.status().is_success() => response
                .json::<StatusResponse>()
                .await
                .map(|status| status.connected)
                .unwrap_or(false),
            Ok(response) => {
                tracing::debug!(status = %response.status(), "WhatsApp status check failed");
                false
            }
            Err(e) => {
                tracing::debug!("WhatsApp status check error: {}", e);
                false
            }
        };

        let previous = self.connected.swap(connected, Ordering::SeqCst);
        if previous != connected {
            tracing::info!(connected, "WhatsApp session state changed");
        }
        connected
    }

    pub fn spawn_health_check(&self, interval: Duration) -> JoinHandle<()> {
        let sender = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                sender.refresh_connection().await;
            }
        })
    }

    async fn send_once(&self, phone: &str, text: &str) -> Result<(), String> {
        let request = self
            .authorized(self.client.post(self.url("/send")))
            .json(&SendRequest {
                phone,
                message: text,
            });

        let response = tokio::time::timeout(self.retry.attempt_timeout, request.send())
            .await
            .map_err(|_| format!("timed out after {:?}", self.retry.attempt_timeout))?
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(format!("gateway responded {}: {}", status.as_u16(), body))
    }
}

#[async_trait]
impl MessagingSender for WhatsAppSender {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn send_message(&self, destination: &str, text: &str) -> Result<(), MessagingError> {
        let phone = normalize_phone(destination)?;

        if !self.is_connected() {
            return Err(MessagingError::NotConnected);
        }

        let mut last_error = String::new();
        for attempt in 1..=self.retry.max_attempts {
            match self.send_once(&phone, text).await {
                Ok(()) => {
                    tracing::debug!(destination = %mask_destination(&phone), attempt, "Message delivered");
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(
                        destination = %mask_destination(&phone),
                        attempt,
                        max_attempts = self.retry.max_attempts,
                        "Message delivery failed: {}",
                        e
                    );
                    last_error = e;
                }
            }

            if attempt < self.retry.max_attempts {
                tokio::time::sleep(self.retry.delay).await;
            }
        }

        Err(MessagingError::SendFailed {
            attempts: self.retry.max_attempts,
            reason: last_error,
        })
    }
}
