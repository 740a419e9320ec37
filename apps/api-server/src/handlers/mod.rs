//! HTTP handlers and route configuration.

mod health;
mod post;
mod user;

use actix_web::web;
use uuid::Uuid;

use crate::middleware::error::{AppError, AppResult};
use crate::middleware::rate_limit::RateLimitMiddleware;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(health::welcome)).service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/post")
                    .route("", web::get().to(post::list_posts))
                    .route("/create", web::post().to(post::create_post))
                    .route("/author/{id}", web::get().to(post::list_posts_by_author))
                    .route("/{id}", web::get().to(post::get_post))
                    .route("/{id}", web::put().to(post::update_post))
                    .route("/{id}", web::delete().to(post::delete_post)),
            )
            .service(
                web::scope("/user")
                    .wrap(RateLimitMiddleware)
                    .route("/register", web::post().to(user::register))
                    .route("/login", web::post().to(user::login)),
            ),
    );
}

/// Parse a path id, naming the entity in the error.
fn parse_id(raw: &str, what: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::BadRequest(format!("{} id is invalid", what)))
}
