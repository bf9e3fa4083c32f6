//! Product submission extractor
//!
//! Parses the multipart body of `POST /save` before the handler runs. The single
//! `image` part is checked against the accepted formats and buffered in memory;
//! anything that breaks the upload rules is rejected here, so the handler only
//! ever sees a well-formed submission.

use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::{dev::Payload, http::StatusCode, web, FromRequest, HttpRequest, HttpResponse, ResponseError};
use bytes::{Bytes, BytesMut};
use futures::{future::LocalBoxFuture, TryStreamExt};
use thiserror::Error;
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::api::error::ErrorBody;
use crate::config::UploadSettings;
use crate::domain::{allowed_list, file_extension, ImageFormat};

pub const PRODUCT_ID_FIELD: &str = "productId";
pub const PRODUCT_NAME_FIELD: &str = "productName";
pub const QUANTITY_FIELD: &str = "quantity";
pub const IMAGE_FIELD: &str = "image";

/// Size limits applied while reading a submission
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub max_file_size: usize,
    pub max_field_size: usize,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_file_size: 2_000_000,
            max_field_size: 1_048_576,
        }
    }
}

impl From<&UploadSettings> for UploadPolicy {
    fn from(settings: &UploadSettings) -> Self {
        Self {
            max_file_size: settings.max_file_size,
            max_field_size: settings.max_field_size,
        }
    }
}

/// Rejections raised while reading a submission
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Malformed multipart body: {0}")]
    Multipart(String),

    #[error("Images only: {file_name} ({content_type}) is not one of {allowed}")]
    UnsupportedType {
        file_name: String,
        content_type: String,
        allowed: String,
    },

    #[error("Image exceeds the {limit} byte limit")]
    FileTooLarge { limit: usize },

    #[error("Field '{0}' exceeds the size limit")]
    FieldTooLarge(String),

    #[error("Unexpected file field '{0}'")]
    UnexpectedFile(String),

    #[error("Field '{0}' is not valid UTF-8")]
    InvalidText(String),

    #[error("productId is required")]
    MissingProductId,
}

impl From<MultipartError> for UploadError {
    fn from(err: MultipartError) -> Self {
        UploadError::Multipart(err.to_string())
    }
}

impl ResponseError for UploadError {
    fn status_code(&self) -> StatusCode {
        match self {
            UploadError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        ErrorBody::response(self.status_code(), self.to_string())
    }
}

/// A validated image held in memory
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    /// Extension as written in the file name
    pub extension: String,
    pub content_type: String,
    pub format: ImageFormat,
    pub data: Bytes,
}

/// Fields of a product submission, sent as `multipart/form-data`
#[derive(Debug, Default, ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ProductUpload {
    /// Primary key; an existing product with the same id is replaced
    pub product_id: String,
    pub product_name: String,
    /// Stored as submitted
    pub quantity: String,
    /// jpeg, jpg, png or gif, at most 2 MB
    #[schema(value_type = String, format = Binary)]
    pub image: Option<ImageUpload>,
}

impl FromRequest for ProductUpload {
    type Error = UploadError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let policy = req
            .app_data::<web::Data<UploadPolicy>>()
            .map(|p| p.get_ref().clone())
            .unwrap_or_default();
        let multipart = Multipart::new(req.headers(), payload.take());

        Box::pin(async move {
            let result = read_product_form(multipart, &policy).await;
            if let Err(ref e) = result {
                warn!(error = %e, "Rejected product submission");
            }
            result
        })
    }
}

async fn read_product_form(
    mut multipart: Multipart,
    policy: &UploadPolicy,
) -> Result<ProductUpload, UploadError> {
    let mut form = ProductUpload::default();

    while let Some(mut field) = multipart.try_next().await? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(String::from);

        let Some(file_name) = file_name else {
            let value = read_limited(&mut field, policy.max_field_size)
                .await?
                .ok_or_else(|| UploadError::FieldTooLarge(name.clone()))?;
            let text = String::from_utf8(value.to_vec())
                .map_err(|_| UploadError::InvalidText(name.clone()))?;

            match name.as_str() {
                PRODUCT_ID_FIELD => form.product_id = text,
                PRODUCT_NAME_FIELD => form.product_name = text,
                QUANTITY_FIELD => form.quantity = text,
                _ => debug!(field = %name, "Ignoring unknown form field"),
            }
            continue;
        };

        if name != IMAGE_FIELD || form.image.is_some() {
            return Err(UploadError::UnexpectedFile(name));
        }

        // Browsers send a part with a blank filename when no file was chosen
        if file_name.is_empty() {
            while field.try_next().await?.is_some() {}
            continue;
        }

        let content_type = field
            .content_type()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_default();
        let (extension, format) = check_file_type(&file_name, &content_type)?;

        let data = read_limited(&mut field, policy.max_file_size)
            .await?
            .ok_or(UploadError::FileTooLarge {
                limit: policy.max_file_size,
            })?;

        debug!(file_name = %file_name, size = data.len(), "Buffered image upload");

        form.image = Some(ImageUpload {
            file_name,
            extension,
            content_type,
            format,
            data,
        });
    }

    if form.product_id.is_empty() {
        return Err(UploadError::MissingProductId);
    }

    Ok(form)
}

/// Both the extension and the declared MIME type must name an accepted format
fn check_file_type(file_name: &str, content_type: &str) -> Result<(String, ImageFormat), UploadError> {
    let extension = file_extension(file_name);
    let by_extension = extension.and_then(ImageFormat::from_extension);
    let by_mime = ImageFormat::from_mime(content_type);

    match (extension, by_extension, by_mime) {
        (Some(ext), Some(format), Some(_)) => Ok((ext.to_string(), format)),
        _ => Err(UploadError::UnsupportedType {
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            allowed: allowed_list(),
        }),
    }
}

/// Buffer a field, or `None` as soon as it grows past `limit`
async fn read_limited(field: &mut Field, limit: usize) -> Result<Option<Bytes>, UploadError> {
    let mut buf = BytesMut::new();

    while let Some(chunk) = field.try_next().await? {
        if buf.len() + chunk.len() > limit {
            return Ok(None);
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(Some(buf.freeze()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_file_type_accepts_matching_pairs() {
        let (ext, format) = check_file_type("shelf.PNG", "image/png").unwrap();
        assert_eq!(ext, "PNG");
        assert_eq!(format, ImageFormat::Png);

        // extension and MIME only need to be accepted, not identical
        assert!(check_file_type("photo.jpg", "image/jpeg").is_ok());
        assert!(check_file_type("photo.jpeg", "image/gif").is_ok());
    }

    #[test]
    fn test_check_file_type_rejects() {
        assert!(check_file_type("notes.txt", "text/plain").is_err());
        assert!(check_file_type("notes.txt", "image/png").is_err());
        assert!(check_file_type("image.png", "text/plain").is_err());
        assert!(check_file_type("png", "image/png").is_err());
        assert!(check_file_type("image.png", "").is_err());
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(
            UploadError::FileTooLarge { limit: 10 }.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(UploadError::MissingProductId.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            UploadError::UnexpectedFile("avatar".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_policy_from_settings() {
        let settings = UploadSettings {
            max_file_size: 10,
            max_field_size: 20,
        };
        let policy = UploadPolicy::from(&settings);
        assert_eq!(policy.max_file_size, 10);
        assert_eq!(policy.max_field_size, 20);
    }
}
