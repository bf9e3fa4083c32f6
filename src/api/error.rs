//! Error responses shared by the product routes

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::storage::StorageError;
use crate::views::ViewError;

/// JSON body of every failed request
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn response(status: StatusCode, message: impl Into<String>) -> HttpResponse {
        HttpResponse::build(status).json(ErrorBody {
            error: message.into(),
        })
    }
}

/// Failures raised inside the route handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("image is required")]
    MissingImage,

    #[error("Image not found: {0}")]
    ImageNotFound(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Render(#[from] ViewError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingImage => StatusCode::BAD_REQUEST,
            ApiError::ImageNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage(_) | ApiError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        ErrorBody::response(self.status_code(), self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::MissingImage.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::ImageNotFound("a/1.png".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        let err = ApiError::from(StorageError::Scan("throttled".to_string()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Scan failed: throttled");
    }
}
