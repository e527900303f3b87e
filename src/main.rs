use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod ledger;
mod model;
mod routes;
mod service;
mod store;
mod utils;

use config::Config;
use db::init_db;

use crate::docs::ApiDoc;
use crate::service::LedgerService;
use crate::utils::holiday_cache::HolidayCache;
use crate::utils::notification_bus::{NotificationBus, run_dispatcher};
use anyhow::Context;
use std::time::Duration;
use tracing::{error, info};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

/// Periodically moves lapsed comp-off credits to `expired` across all tenants.
async fn run_expiry_sweep(service: LedgerService, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    loop {
        ticker.tick().await;
        match service.sweep_all_expired().await {
            Ok(0) => {}
            Ok(swept) => info!(swept, "Expired comp-off credits"),
            Err(e) => error!(error = %e, "Expiry sweep failed"),
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url, config.db_max_connections)
        .await
        .context("failed to connect to database")?;

    let (bus, events) = NotificationBus::new(config.notification_queue_capacity);
    actix_web::rt::spawn(run_dispatcher(events));

    let holidays = HolidayCache::new(pool.clone(), config.holiday_cache_ttl());
    let service = LedgerService::new(
        pool,
        holidays,
        bus,
        config.lock_wait_timeout_secs,
    );

    match config.expiry_sweep_interval() {
        Some(every) => {
            actix_web::rt::spawn(run_expiry_sweep(service.clone(), every));
        }
        None => info!("Periodic expiry sweep disabled"),
    }

    let limiter = routes::build_limiter(config.rate_protected_per_min)?;
    let server_addr = config.server_addr.clone();
    let api_prefix = config.api_prefix.clone();
    let service_data = Data::new(service);
    let config_data = Data::new(config);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(service_data.clone())
            .app_data(config_data.clone())
            // Protected routes with rate limiting
            .configure(|cfg| routes::configure(cfg, &api_prefix, &limiter))
    })
    .bind(&server_addr)
    .with_context(|| format!("failed to bind {}", server_addr))?
    .run()
    .await?;

    Ok(())
}
