use clap::{Parser, Subcommand};
use sqlx::PgPool;
use std::sync::Arc;

use crate::adapters::{PostgresCatalog, PostgresNotificationLog, PostgresOrderStore};
use crate::config::Config;
use crate::health::{DependencyChecker, MessagingChecker, PaymentGatewayChecker, PostgresChecker};
use crate::messaging::WhatsAppSender;
use crate::payment::XenditClient;
use crate::services::dashboard::business_offset;
use crate::{AppSettings, AppState, Collaborators};

#[derive(Parser)]
#[command(name = "foodcourt-core")]
#[command(about = "Food court ordering backend: checkout, payments and booth notifications", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Database management commands
    #[command(subcommand)]
    Db(DbCommands),

    /// Order management commands
    #[command(subcommand)]
    Order(OrderCommands),

    /// Configuration validation
    Config,
}

#[derive(Subcommand)]
pub enum DbCommands {
    /// Run database migrations
    Migrate,
    /// Insert sample booths and menus
    Seed,
}

#[derive(Subcommand)]
pub enum OrderCommands {
    /// Move an order to a new status
    Status {
        #[arg(value_name = "CODE")]
        code: String,
        /// pending, confirmed, preparing, ready, completed or cancelled
        #[arg(value_name = "STATUS")]
        status: String,
    },
    /// Send the order to its booths over WhatsApp
    Notify {
        #[arg(value_name = "CODE")]
        code: String,
    },
}

/// Live adapters built from configuration.
pub struct Runtime {
    pub state: AppState,
    pub messaging: WhatsAppSender,
}

pub fn build_runtime(config: &Config, pool: PgPool) -> Runtime {
    let catalog = Arc::new(PostgresCatalog::new(pool.clone()));
    let xendit = XenditClient::new(config.xendit_api_url.clone(), config.xendit_secret_key.clone());
    let messaging = WhatsAppSender::new(
        config.whatsapp_gateway_url.clone(),
        config.whatsapp_gateway_token.clone(),
    );
    let messaging_port = Arc::new(messaging.clone());

    let deps = Collaborators {
        orders: Arc::new(PostgresOrderStore::new(pool.clone())),
        menus: catalog.clone(),
        catalog,
        notification_logs: Arc::new(PostgresNotificationLog::new(pool.clone())),
        payments: Arc::new(xendit.clone()),
        messaging: messaging_port.clone(),
    };

    let settings = AppSettings {
        base_url: config.base_url.clone(),
        admin_api_token: config.admin_api_token.clone(),
        callback_token: config.xendit_callback_token.clone(),
        business_offset: business_offset(config.business_utc_offset_hours),
        log_request_body: config.log_request_body,
    };

    let checkers: Vec<Arc<dyn DependencyChecker>> = vec![
        Arc::new(PostgresChecker::new(pool)),
        Arc::new(PaymentGatewayChecker::new(xendit)),
        Arc::new(MessagingChecker::new(messaging_port)),
    ];

    Runtime {
        state: AppState::new(deps, settings, checkers),
        messaging,
    }
}

pub async fn handle_db_migrate(config: &Config) -> anyhow::Result<()> {
    let pool = crate::db::create_pool(config).await?;

    tracing::info!("Running database migrations...");
    crate::db::run_migrations(&pool).await?;

    println!("✓ Database migrations completed");
    Ok(())
}

pub async fn handle_db_seed(config: &Config) -> anyhow::Result<()> {
    let pool = crate::db::create_pool(config).await?;
    let catalog = PostgresCatalog::new(pool);

    let summary = crate::db::seed::seed_catalog(&catalog).await?;
    println!(
        "✓ Seeded {} booth(s) and {} menu(s)",
        summary.booths_created, summary.menus_created
    );
    Ok(())
}

pub async fn handle_order_status(config: &Config, code: &str, status: &str) -> anyhow::Result<()> {
    let pool = crate::db::create_pool(config).await?;
    let runtime = build_runtime(config, pool);

    let order = runtime.state.orders.update_order_status(code, status).await?;
    println!(
        "✓ Order {} is now {} (payment {})",
        order.order_code, order.order_status, order.payment_status
    );
    Ok(())
}

pub async fn handle_order_notify(config: &Config, code: &str) -> anyhow::Result<()> {
    let pool = crate::db::create_pool(config).await?;
    let runtime = build_runtime(config, pool);
    runtime.messaging.connect().await?;

    let summary = runtime
        .state
        .dispatcher
        .send_order_notification_to_seller(code)
        .await?;
    println!(
        "✓ Order {} sent to: {}",
        summary.order_code,
        summary.booths_notified.join(", ")
    );
    Ok(())
}

pub fn handle_config_validate(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Validating configuration...");

    println!("Configuration:");
    for (key, value) in config.redacted() {
        println!("  {:<28} {}", key, value);
    }

    println!("✓ Configuration is valid");
    Ok(())
}
