//! HTTP handlers and route configuration.

mod auth;
mod health;
mod posts;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(auth::signup))
                    .route("/login", web::post().to(auth::login)),
            )
            // Post routes
            .service(
                web::scope("/posts")
                    .route("", web::post().to(posts::create))
                    .route("", web::get().to(posts::list))
                    .route("/{id}", web::get().to(posts::get))
                    .route("/{id}", web::patch().to(posts::update))
                    .route("/{id}", web::delete().to(posts::delete)),
            ),
    );
}
