pub mod whatsapp;

pub use whatsapp::{RetryPolicy, WhatsAppSender};

use thiserror::Error;

pub const DEFAULT_COUNTRY_PREFIX: &str = "62";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessagingError {
    #[error("messaging session is not connected")]
    NotConnected,
    #[error("invalid destination '{0}'")]
    InvalidDestination(String),
    #[error("delivery failed after {attempts} attempt(s): {reason}")]
    SendFailed { attempts: u32, reason: String },
}

/// Normalizes a phone-like destination: digits only, and a leading `0`
/// becomes the country prefix.
pub fn normalize_phone(raw: &str) -> Result<String, MessagingError> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Err(MessagingError::InvalidDestination(raw.to_string()));
    }

    match digits.strip_prefix('0') {
        Some(rest) => Ok(format!("{}{}", DEFAULT_COUNTRY_PREFIX, rest)),
        None => Ok(digits),
    }
}
