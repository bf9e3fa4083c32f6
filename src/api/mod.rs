//! API module - HTTP routes and handlers

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;

use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::openapi::ApiDoc;

/// Configure all routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::products::list_products))
        .route("/save", web::post().to(handlers::products::save_product))
        .route("/delete", web::post().to(handlers::products::delete_products))
        .route("/health", web::get().to(handlers::health::health_check))
        .route(
            &format!("{}/{{key:.*}}", handlers::images::IMAGE_ROUTE),
            web::get().to(handlers::images::serve_image),
        )
        // Swagger UI and OpenAPI spec
        .service(
            SwaggerUi::new("/swagger-ui/{_:.*}")
                .url("/api-docs/openapi.json", ApiDoc::openapi())
        );
}
