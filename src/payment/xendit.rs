use async_trait::async_trait;
use failsafe::futures::CircuitBreaker as FuturesCircuitBreaker;
use failsafe::{backoff, failure_policy, Config, Error as FailsafeError, StateMachine};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::{Invoice, InvoiceRequest, PaymentError};
use crate::ports::PaymentGateway;

pub const DEFAULT_XENDIT_API_URL: &str = "https://api.xendit.co";
const INVOICE_CURRENCY: &str = "IDR";
const INVOICE_REMINDER_TIME: i32 = 1;

#[derive(Debug, Serialize)]
struct CreateInvoiceBody<'a> {
    external_id: &'a str,
    amount: i64,
    description: &'a str,
    currency: &'a str,
    success_redirect_url: &'a str,
    failure_redirect_url: &'a str,
    reminder_time: i32,
}

/// HTTP client for the Xendit invoice API
#[derive(Clone)]
pub struct XenditClient {
    client: Client,
    base_url: String,
    secret_key: String,
    circuit_breaker: StateMachine<failure_policy::ConsecutiveFailures<backoff::EqualJittered>, ()>,
}

impl XenditClient {
    pub fn new(base_url: String, secret_key: String) -> Self {
        Self::with_circuit_breaker(base_url, secret_key, 3, 60)
    }

    /// Creates a client with custom circuit breaker configuration
    pub fn with_circuit_breaker(
        base_url: String,
        secret_key: String,
        failure_threshold: u32,
        reset_timeout_secs: u64,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        let backoff = backoff::equal_jittered(
            Duration::from_secs(reset_timeout_secs),
            Duration::from_secs(reset_timeout_secs * 2),
        );
        let policy = failure_policy::consecutive_failures(failure_threshold, backoff);
        let circuit_breaker = Config::new().failure_policy(policy).build();

        XenditClient {
            client,
            base_url,
            secret_key,
            circuit_breaker,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the current state of the circuit breaker
    pub fn circuit_state(&self) -> String {
        if self.circuit_breaker.is_call_permitted() {
            "closed".to_string()
        } else {
            "open".to_string()
        }
    }
}

#[async_trait]
impl PaymentGateway for XenditClient {
    async fn create_invoice(&self, request: &InvoiceRequest) -> Result<Invoice, PaymentError> {
        let url = format!("{}/v2/invoices", self.base_url.trim_end_matches('/'));
        let client = self.client.clone();
        let secret_key = self.secret_key.clone();
        let body = serde_json::to_value(CreateInvoiceBody {
            external_id: &request.external_id,
            amount: request.amount,
            description: &request.description,
            currency: INVOICE_CURRENCY,
            success_redirect_url: &request.success_redirect_url,
            failure_redirect_url: &request.failure_redirect_url,
            reminder_time: INVOICE_REMINDER_TIME,
        })
        .map_err(|e| PaymentError::InvalidResponse(e.to_string()))?;

        let result = self
            .circuit_breaker
            .call(async move {
                let response = client
                    .post(&url)
                    .basic_auth(secret_key, None::<&str>)
                    .json(&body)
                    .send()
                    .await?;

                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(PaymentError::Rejected {
                        status: status.as_u16(),
                        body,
                    });
                }

                let invoice = response
                    .json::<Invoice>()
                    .await
                    .map_err(|e| PaymentError::InvalidResponse(e.to_string()))?;
                Ok(invoice)
            })
            .await;

        match result {
            Ok(invoice) => {
                tracing::info!(
                    external_id = %request.external_id,
                    invoice_id = %invoice.id,
                    "Invoice issued"
                );
                Ok(invoice)
            }
            Err(FailsafeError::Rejected) => Err(PaymentError::CircuitBreakerOpen(
                "Xendit API circuit breaker is open".to_string(),
            )),
            Err(FailsafeError::Inner(e)) => Err(e),
        }
    }
}
