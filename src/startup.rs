//! Preflight checks run by `serve` before the listener binds.

use anyhow::{Context, Result};
use sqlx::PgPool;
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::config::Config;

const MESSAGING_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Fail(String),
}

/// One preflight item. Advisory checks are reported but never block startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    pub name: &'static str,
    pub required: bool,
    pub outcome: Outcome,
}

impl Check {
    fn from_result(name: &'static str, required: bool, result: Result<()>) -> Self {
        let outcome = match result {
            Ok(()) => Outcome::Pass,
            Err(e) => Outcome::Fail(format!("{:#}", e)),
        };
        Self {
            name,
            required,
            outcome,
        }
    }

    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Pass
    }
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub checks: Vec<Check>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// The messaging session may be down at startup; the health loop reconnects.
    pub fn is_valid(&self) -> bool {
        self.checks.iter().all(|c| c.passed() || !c.required)
    }

    pub fn failures(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(|c| !c.passed())
    }

    pub fn print(&self) {
        println!("{}", self);
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n=== Startup Validation Report ===")?;
        for check in &self.checks {
            let mark = match (&check.outcome, check.required) {
                (Outcome::Pass, _) => "✅ OK",
                (Outcome::Fail(_), true) => "❌ FAIL",
                (Outcome::Fail(_), false) => "⚠️  DEGRADED",
            };
            writeln!(f, "{:<24}{}", check.name, mark)?;
        }

        for check in self.failures() {
            if let Outcome::Fail(reason) = &check.outcome {
                writeln!(f, "  - {}: {}", check.name, reason)?;
            }
        }
        for warning in &self.warnings {
            writeln!(f, "  ! {}", warning)?;
        }

        let verdict = if self.is_valid() { "✅ PASS" } else { "❌ FAIL" };
        writeln!(f, "\nOverall Status: {}", verdict)?;
        write!(f, "=================================")
    }
}

pub async fn validate_environment(config: &Config, pool: &PgPool) -> Result<ValidationReport> {
    let mut report = ValidationReport::default();

    report
        .checks
        .push(Check::from_result("Configuration", true, validate_settings(config)));
    report
        .checks
        .push(Check::from_result("Database", true, validate_database(pool).await));
    report.checks.push(Check::from_result(
        "Payment gateway",
        true,
        validate_payment_gateway(config),
    ));
    report.checks.push(Check::from_result(
        "Messaging gateway",
        false,
        check_messaging(&config.whatsapp_gateway_url).await,
    ));

    report.warnings = security_warnings(config);
    Ok(report)
}

fn validate_settings(config: &Config) -> Result<()> {
    if config.server_port == 0 {
        anyhow::bail!("SERVER_PORT must be greater than 0");
    }
    if !(-12..=14).contains(&config.business_utc_offset_hours) {
        anyhow::bail!("BUSINESS_UTC_OFFSET_HOURS must be between -12 and 14");
    }
    Url::parse(&config.base_url).context("BASE_URL is not a valid URL")?;
    Url::parse(&config.whatsapp_gateway_url).context("WHATSAPP_GATEWAY_URL is not a valid URL")?;
    Ok(())
}

async fn validate_database(pool: &PgPool) -> Result<()> {
    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .context("cannot read the migrations table")?;

    if applied == 0 {
        anyhow::bail!("no migrations applied");
    }
    Ok(())
}

fn validate_payment_gateway(config: &Config) -> Result<()> {
    if config.xendit_secret_key.trim().is_empty() {
        anyhow::bail!("XENDIT_SECRET_KEY is empty");
    }
    Url::parse(&config.xendit_api_url).context("XENDIT_API_URL is not a valid URL")?;
    Ok(())
}

async fn check_messaging(gateway_url: &str) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(MESSAGING_CHECK_TIMEOUT)
        .build()?;

    let response = client
        .get(format!("{}/status", gateway_url.trim_end_matches('/')))
        .send()
        .await
        .context("WhatsApp gateway unreachable")?;

    if !response.status().is_success() {
        anyhow::bail!("WhatsApp gateway answered {}", response.status());
    }
    Ok(())
}

fn security_warnings(config: &Config) -> Vec<String> {
    let mut warnings = Vec::new();
    if config.admin_api_token.is_none() {
        warnings.push("ADMIN_API_TOKEN is not set, admin endpoints will reject every request".to_string());
    }
    if config.xendit_callback_token.is_none() {
        warnings.push("XENDIT_CALLBACK_TOKEN is not set, payment webhooks are not authenticated".to_string());
    }
    warnings
}
