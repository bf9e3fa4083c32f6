//! Image endpoint for the in-memory bucket
//!
//! S3 serves its public objects itself. With `storage.backend = "memory"` the stored
//! bytes are only reachable through this route, which is where the memory store's
//! URLs point by default.

use actix_web::{http::header, web, HttpResponse};
use tracing::debug;

use crate::api::error::{ApiError, ErrorBody};
use crate::AppState;

/// Path prefix the in-memory store publishes its objects under
pub const IMAGE_ROUTE: &str = "/images";

/// GET /images/{key} - Serve an image held by the in-memory bucket
#[utoipa::path(
    get,
    path = "/images/{key}",
    tag = "products",
    params(
        ("key" = String, Path, description = "Object key, `{productId}/{timestamp}.{ext}`")
    ),
    responses(
        (status = 200, description = "Stored image bytes with their upload content type"),
        (status = 404, description = "No such object, or the AWS backend is active", body = ErrorBody)
    )
)]
pub async fn serve_image(
    state: web::Data<AppState>,
    key: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let key = key.into_inner();

    let Some(object) = state.local_images.as_ref().and_then(|store| store.get(&key)) else {
        debug!(key = %key, "Image not found");
        return Err(ApiError::ImageNotFound(key));
    };

    Ok(HttpResponse::Ok()
        .content_type(object.content_type)
        .insert_header((header::CACHE_CONTROL, "public, max-age=3600"))
        .body(object.data))
}
