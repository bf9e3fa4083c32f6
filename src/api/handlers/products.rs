//! Product listing, creation and deletion endpoints

use actix_web::{http::header, web, HttpResponse};
use futures::future::try_join_all;
use tracing::{error, info, warn};

use crate::api::error::{ApiError, ErrorBody};
use crate::api::middleware::{DeleteSelection, ProductUpload};
use crate::domain::{ImageKey, Product};
use crate::AppState;

fn redirect_home() -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/"))
        .finish()
}

/// GET / - Render every product in the table
#[utoipa::path(
    get,
    path = "/",
    tag = "products",
    responses(
        (status = 200, description = "Rendered product listing", body = String, content_type = "text/html"),
        (status = 500, description = "Scan or render failed", body = ErrorBody)
    )
)]
pub async fn list_products(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let products = match state.products.scan().await {
        Ok(products) => products,
        Err(e) => {
            error!(error = %e, "Failed to scan products");
            return Err(e.into());
        }
    };

    let html = match state.views.render_index(&products) {
        Ok(html) => html,
        Err(e) => {
            error!(error = %e, "Failed to render product listing");
            return Err(e.into());
        }
    };

    info!(count = products.len(), "Listed products");

    Ok(HttpResponse::Ok()
        .content_type(header::ContentType::html())
        .body(html))
}

/// POST /save - Upload the product image, then store the product
///
/// The image upload finishes before the table write starts. If the write fails
/// the uploaded object is removed again.
#[utoipa::path(
    post,
    path = "/save",
    tag = "products",
    request_body(content = ProductUpload, content_type = "multipart/form-data"),
    responses(
        (status = 303, description = "Product saved, redirect to the listing"),
        (status = 400, description = "Missing id or image, or not an accepted image type", body = ErrorBody),
        (status = 413, description = "Image larger than the upload limit", body = ErrorBody),
        (status = 500, description = "Upload or table write failed", body = ErrorBody)
    )
)]
pub async fn save_product(
    state: web::Data<AppState>,
    form: ProductUpload,
) -> Result<HttpResponse, ApiError> {
    let ProductUpload {
        product_id,
        product_name,
        quantity,
        image,
    } = form;

    let image = match image {
        Some(image) => image,
        None => {
            warn!(product_id = %product_id, "Product submitted without an image");
            return Err(ApiError::MissingImage);
        }
    };

    let key = ImageKey::now(&product_id, &image.extension).to_key();

    info!(
        product_id = %product_id,
        key = %key,
        file_name = %image.file_name,
        format = image.format.as_str(),
        size = image.data.len(),
        "Saving product"
    );

    let stored = match state.images.upload(&key, image.data, &image.content_type).await {
        Ok(stored) => stored,
        Err(e) => {
            error!(product_id = %product_id, key = %key, error = %e, "Image upload failed");
            return Err(e.into());
        }
    };

    let product = Product {
        product_id,
        product_name,
        quantity,
        url_image: Some(stored.public_url),
    };

    if let Err(e) = state.products.put(&product).await {
        error!(product_id = %product.product_id, error = %e, "Failed to store product");
        if let Err(cleanup) = state.images.remove(&stored.key).await {
            warn!(key = %stored.key, error = %cleanup, "Failed to remove orphaned image");
        }
        return Err(e.into());
    }

    info!(
        product_id = %product.product_id,
        key = %stored.key,
        size = stored.size,
        "Product saved"
    );
    Ok(redirect_home())
}

/// POST /delete - Delete every product named by the form's field names
///
/// Accepts urlencoded, multipart or JSON object bodies. Deletes run concurrently and the
/// response is sent once all of them have finished or the first one fails.
#[utoipa::path(
    post,
    path = "/delete",
    tag = "products",
    responses(
        (status = 303, description = "Selected products deleted (or nothing selected), redirect to the listing"),
        (status = 400, description = "Unreadable body or unsupported content type", body = ErrorBody),
        (status = 500, description = "A delete failed", body = ErrorBody)
    )
)]
pub async fn delete_products(
    state: web::Data<AppState>,
    selection: DeleteSelection,
) -> Result<HttpResponse, ApiError> {
    if selection.is_empty() {
        return Ok(redirect_home());
    }

    let deletions = selection
        .ids()
        .iter()
        .map(|id| state.products.delete(id));

    if let Err(e) = try_join_all(deletions).await {
        error!(count = selection.len(), error = %e, "Failed to delete products");
        return Err(e.into());
    }

    info!(count = selection.len(), ids = ?selection.ids(), "Deleted products");
    Ok(redirect_home())
}
