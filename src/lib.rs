pub mod adapters;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod health;
pub mod messaging;
pub mod middleware;
pub mod payment;
pub mod ports;
pub mod services;
pub mod startup;
pub mod utils;
pub mod validation;

use axum::{
    routing::{get, patch, post, put},
    Router,
};
use chrono::FixedOffset;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;

use crate::health::DependencyChecker;
use crate::middleware::request_logger::{request_logger_middleware, RequestLogConfig};
use crate::ports::{
    CatalogGateway, CatalogRepository, MessagingSender, NotificationLogStore, OrderStore,
    PaymentGateway,
};
use crate::services::{
    CatalogService, Dashboard, NotificationDispatcher, NotificationLog, OrderLifecycle,
};

/// Adapters wired into the services. `menus` and `catalog` are usually the
/// same object seen through two ports.
#[derive(Clone)]
pub struct Collaborators {
    pub orders: Arc<dyn OrderStore>,
    pub menus: Arc<dyn CatalogGateway>,
    pub catalog: Arc<dyn CatalogRepository>,
    pub notification_logs: Arc<dyn NotificationLogStore>,
    pub payments: Arc<dyn PaymentGateway>,
    pub messaging: Arc<dyn MessagingSender>,
}

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub base_url: String,
    pub admin_api_token: Option<String>,
    pub callback_token: Option<String>,
    pub business_offset: FixedOffset,
    pub log_request_body: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<OrderLifecycle>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub notification_log: Arc<NotificationLog>,
    pub dashboard: Arc<Dashboard>,
    pub catalog: Arc<CatalogService>,
    pub health_checkers: Arc<Vec<Arc<dyn DependencyChecker>>>,
    pub settings: Arc<AppSettings>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        deps: Collaborators,
        settings: AppSettings,
        health_checkers: Vec<Arc<dyn DependencyChecker>>,
    ) -> Self {
        let orders = OrderLifecycle::new(
            deps.orders.clone(),
            deps.menus,
            deps.payments,
            settings.base_url.clone(),
        );
        let dispatcher = NotificationDispatcher::new(
            deps.orders.clone(),
            deps.messaging,
            deps.notification_logs.clone(),
        );

        Self {
            orders: Arc::new(orders),
            dispatcher: Arc::new(dispatcher),
            notification_log: Arc::new(NotificationLog::new(deps.notification_logs)),
            dashboard: Arc::new(Dashboard::new(deps.orders, settings.business_offset)),
            catalog: Arc::new(CatalogService::new(deps.catalog)),
            health_checkers: Arc::new(health_checkers),
            settings: Arc::new(settings),
            start_time: Instant::now(),
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let admin = Router::new()
        .route("/dashboard", get(handlers::admin::dashboard))
        .route("/orders", get(handlers::admin::list_orders))
        .route("/orders/:code", get(handlers::admin::get_order))
        .route("/orders/:code/status", patch(handlers::admin::update_order_status))
        .route("/orders/:code/notify", post(handlers::admin::notify_sellers))
        .route("/logs", get(handlers::logs::list_logs))
        .route("/logs/track", get(handlers::logs::track_click))
        .route(
            "/booths",
            get(handlers::catalog::admin_list_booths).post(handlers::catalog::create_booth),
        )
        .route(
            "/booths/:id",
            put(handlers::catalog::update_booth).delete(handlers::catalog::delete_booth),
        )
        .route(
            "/menus",
            get(handlers::catalog::admin_list_menus).post(handlers::catalog::create_menu),
        )
        .route(
            "/menus/:id",
            put(handlers::catalog::update_menu).delete(handlers::catalog::delete_menu),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::admin_auth,
        ));

    let webhooks = Router::new()
        .route("/xendit", post(handlers::webhook::xendit_callback))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::callback_auth,
        ));

    let log_config = RequestLogConfig {
        log_body: state.settings.log_request_body,
    };

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/menus", get(handlers::catalog::list_menus))
        .route("/api/menus/:id", get(handlers::catalog::get_menu))
        .route("/api/booths", get(handlers::catalog::list_booths))
        .route("/api/orders", post(handlers::orders::create_order))
        .route("/api/orders/:code", get(handlers::orders::get_order))
        .nest("/api/webhooks", webhooks)
        .nest("/api/admin", admin)
        .layer(axum::middleware::from_fn_with_state(
            log_config,
            request_logger_middleware,
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
