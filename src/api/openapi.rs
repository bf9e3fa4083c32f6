//! OpenAPI 3.0 specification definition

use utoipa::OpenApi;

use crate::api::error::ErrorBody;
use crate::api::handlers::health::HealthResponse;
use crate::api::middleware::ProductUpload;
use crate::domain::Product;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "R-Inventory",
        version = "1.0.0",
        description = "Product inventory backed by DynamoDB with images in S3",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "/", description = "Current server")
    ),
    tags(
        (name = "system", description = "System health and status endpoints"),
        (name = "products", description = "Product listing, creation and deletion")
    ),
    paths(
        crate::api::handlers::health::health_check,
        crate::api::handlers::products::list_products,
        crate::api::handlers::products::save_product,
        crate::api::handlers::products::delete_products,
        crate::api::handlers::images::serve_image,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorBody,
            Product,
            ProductUpload,
        )
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_product_routes() {
        let spec = ApiDoc::openapi();
        for path in ["/", "/save", "/delete", "/health", "/images/{key}"] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn test_save_body_documents_form_fields() {
        let spec = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let properties = &spec["components"]["schemas"]["ProductUpload"]["properties"];
        for field in ["productId", "productName", "quantity", "image"] {
            assert!(properties.get(field).is_some(), "missing {field}");
        }
        assert_eq!(properties["image"]["format"], "binary");
    }
}
