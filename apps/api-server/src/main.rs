//! # Quill API Server
//!
//! The main entry point for the Actix-web HTTP server.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

use quill_core::ports::RateLimiter;

mod config;
mod handlers;
mod middleware;
mod observability;
mod state;
mod telemetry;

use config::AppConfig;
use observability::RequestIdMiddleware;
use state::AppState;
use telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let (telemetry, log_format_problem) = TelemetryConfig::from_env();
    init_telemetry(&telemetry);
    if let Some(problem) = log_format_problem {
        tracing::warn!("Ignoring LOG_FORMAT: {}", problem);
    }

    let config = AppConfig::from_env();

    tracing::info!("Starting Quill API Server on {}:{}", config.host, config.port);

    let state = AppState::new(&config).await;
    let auth_limiter = build_auth_limiter(&config);

    HttpServer::new(move || {
        let limiter = auth_limiter.clone();

        App::new()
            .wrap(TracingLogger::default())
            .wrap(RequestIdMiddleware)
            .app_data(web::Data::new(state.clone()))
            .configure(|cfg| handlers::configure_routes(cfg, limiter))
            .default_service(web::to(handlers::not_found))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

#[cfg(feature = "rate-limit")]
fn build_auth_limiter(config: &AppConfig) -> Option<Arc<dyn RateLimiter>> {
    use quill_infra::{InMemoryRateLimiter, RateLimitConfig};

    tracing::info!(
        max_requests = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window.as_secs(),
        "Auth rate limiting enabled"
    );

    Some(Arc::new(InMemoryRateLimiter::new(RateLimitConfig {
        max_requests: config.rate_limit.max_requests,
        window: config.rate_limit.window,
    })))
}

#[cfg(not(feature = "rate-limit"))]
fn build_auth_limiter(_config: &AppConfig) -> Option<Arc<dyn RateLimiter>> {
    tracing::info!("Running without rate-limit feature - auth endpoints are unthrottled");
    None
}
