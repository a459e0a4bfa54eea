use anyhow::Context;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::str::FromStr;

use crate::payment::xendit::DEFAULT_XENDIT_API_URL;
use crate::services::dashboard::DEFAULT_UTC_OFFSET_HOURS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" | "" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => anyhow::bail!("LOG_FORMAT must be 'text' or 'json', got '{}'", other),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    /// Public URL of the storefront, used for payment redirects.
    pub base_url: String,
    pub xendit_secret_key: String,
    pub xendit_api_url: String,
    pub xendit_callback_token: Option<String>,
    pub whatsapp_gateway_url: String,
    pub whatsapp_gateway_token: Option<String>,
    pub admin_api_token: Option<String>,
    pub business_utc_offset_hours: i32,
    pub log_format: LogFormat,
    pub log_request_body: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            server_port: parse_or(&get, "SERVER_PORT", 3000)?,
            database_url: get("DATABASE_URL").context("DATABASE_URL must be set")?,
            base_url: get("BASE_URL").unwrap_or_else(|| "http://localhost:3000".to_string()),
            xendit_secret_key: get("XENDIT_SECRET_KEY").context("XENDIT_SECRET_KEY must be set")?,
            xendit_api_url: get("XENDIT_API_URL")
                .unwrap_or_else(|| DEFAULT_XENDIT_API_URL.to_string()),
            xendit_callback_token: get("XENDIT_CALLBACK_TOKEN"),
            whatsapp_gateway_url: get("WHATSAPP_GATEWAY_URL")
                .unwrap_or_else(|| "http://localhost:3001".to_string()),
            whatsapp_gateway_token: get("WHATSAPP_GATEWAY_TOKEN"),
            admin_api_token: get("ADMIN_API_TOKEN"),
            business_utc_offset_hours: parse_or(
                &get,
                "BUSINESS_UTC_OFFSET_HOURS",
                DEFAULT_UTC_OFFSET_HOURS,
            )?,
            log_format: parse_or(&get, "LOG_FORMAT", LogFormat::Text)?,
            log_request_body: parse_or(&get, "LOG_REQUEST_BODY", false)?,
        })
    }

    /// Key/value view for display with secrets masked.
    pub fn redacted(&self) -> Vec<(&'static str, String)> {
        vec![
            ("SERVER_PORT", self.server_port.to_string()),
            ("DATABASE_URL", redact_url(&self.database_url)),
            ("BASE_URL", self.base_url.clone()),
            ("XENDIT_SECRET_KEY", mask(Some(&self.xendit_secret_key))),
            ("XENDIT_API_URL", self.xendit_api_url.clone()),
            ("XENDIT_CALLBACK_TOKEN", mask(self.xendit_callback_token.as_ref())),
            ("WHATSAPP_GATEWAY_URL", self.whatsapp_gateway_url.clone()),
            ("WHATSAPP_GATEWAY_TOKEN", mask(self.whatsapp_gateway_token.as_ref())),
            ("ADMIN_API_TOKEN", mask(self.admin_api_token.as_ref())),
            (
                "BUSINESS_UTC_OFFSET_HOURS",
                self.business_utc_offset_hours.to_string(),
            ),
            ("LOG_FORMAT", format!("{:?}", self.log_format).to_lowercase()),
            ("LOG_REQUEST_BODY", self.log_request_body.to_string()),
        ]
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {}: {}", key, e)),
        None => Ok(default),
    }
}

fn mask(value: Option<&String>) -> String {
    match value {
        Some(v) if !v.is_empty() => "********".to_string(),
        _ => "(unset)".to_string(),
    }
}

fn redact_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut url) if url.password().is_some() => {
            let _ = url.set_password(Some("****"));
            url.to_string()
        }
        Ok(url) => url.to_string(),
        Err(_) => "(unparseable)".to_string(),
    }
}
