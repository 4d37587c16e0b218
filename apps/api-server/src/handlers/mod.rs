//! HTTP handlers and route configuration.

mod auth;
mod health;
mod posts;

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, error::JsonPayloadError, web};

use quill_core::ports::RateLimiter;

use crate::middleware::error::{AppError, AppResult};
use crate::middleware::rate_limit::RateLimitMiddleware;

/// Malformed JSON bodies get the standard error body instead of actix's
/// plain-text default.
fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(err.to_string()).into()
}

/// Fallback for paths no route matches.
pub async fn not_found(req: HttpRequest) -> AppResult<HttpResponse> {
    Err(AppError::NotFound(format!(
        "No route for {} {}",
        req.method(),
        req.path()
    )))
}

/// Configure all application routes.
///
/// `auth_limiter` throttles the `/v1/auth` endpoints; `None` leaves them
/// unthrottled.
pub fn configure_routes(cfg: &mut web::ServiceConfig, auth_limiter: Option<Arc<dyn RateLimiter>>) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .route("/up", web::get().to(health::health_check))
        .service(
            web::scope("/v1")
                .service(
                    web::scope("/auth")
                        .wrap(RateLimitMiddleware::from(auth_limiter))
                        .route("/register", web::post().to(auth::register))
                        .route("/login", web::post().to(auth::login))
                        .route("/logout", web::post().to(auth::logout)),
                )
                .route("/user", web::get().to(auth::me))
                .service(
                    web::resource("/posts")
                        .route(web::get().to(posts::index))
                        .route(web::post().to(posts::store)),
                )
                .service(
                    web::resource("/posts/{id}")
                        .route(web::get().to(posts::show))
                        .route(web::put().to(posts::replace))
                        .route(web::patch().to(posts::patch))
                        .route(web::delete().to(posts::destroy)),
                ),
        );
}
