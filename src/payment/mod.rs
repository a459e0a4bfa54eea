pub mod xendit;

pub use xendit::XenditClient;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Gateway rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("Invalid response from payment gateway: {0}")]
    InvalidResponse(String),
    #[error("Circuit breaker open: {0}")]
    CircuitBreakerOpen(String),
}

/// Hosted invoice request, tagged with the order code as external reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceRequest {
    pub external_id: String,
    pub amount: i64,
    pub description: String,
    pub success_redirect_url: String,
    pub failure_redirect_url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub invoice_url: String,
}
