//! Health check endpoint

use actix_web::{web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub backend: &'static str,
    pub table: String,
    pub bucket: String,
}

/// GET /health - Health check endpoint
///
/// Reports configuration only; no call reaches the table or the bucket.
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let storage = &state.settings.storage;

    HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        backend: storage.backend.as_str(),
        table: storage.table_name.clone(),
        bucket: storage.bucket_name.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use std::sync::Arc;

    use crate::config::Settings;
    use crate::storage::{MemoryImageStore, MemoryProductTable};
    use crate::views::ViewRenderer;

    #[actix_web::test]
    async fn test_health_reports_storage() {
        let state = web::Data::new(AppState {
            settings: Settings::default(),
            products: Arc::new(MemoryProductTable::new()),
            images: Arc::new(MemoryImageStore::new("/images")),
            local_images: None,
            views: ViewRenderer::embedded().unwrap(),
        });
        let app = test::init_service(
            App::new()
                .app_data(state)
                .route("/health", web::get().to(health_check)),
        )
        .await;

        let body: serde_json::Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["backend"], "aws");
        assert_eq!(body["table"], "products");
        assert_eq!(body["bucket"], "products-images");
    }
}
