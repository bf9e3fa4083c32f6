//! Product record and the object key its image is stored under

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Primary key attribute of the product table
pub const PRODUCT_ID_ATTR: &str = "productId";

/// A product row as stored in the table
///
/// Attribute names keep the camelCase spelling used by the table and the views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: String,
    pub product_name: String,
    /// Stored exactly as submitted
    pub quantity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_image: Option<String>,
}

/// Object key for a product image: `{productId}/{timestampMillis}.{extension}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageKey {
    pub product_id: String,
    pub timestamp_millis: i64,
    pub extension: String,
}

impl ImageKey {
    pub fn new(product_id: &str, timestamp_millis: i64, extension: &str) -> Self {
        Self {
            product_id: product_id.to_string(),
            timestamp_millis,
            extension: extension.to_string(),
        }
    }

    /// Key stamped with the current wall-clock time
    pub fn now(product_id: &str, extension: &str) -> Self {
        Self::new(product_id, chrono::Utc::now().timestamp_millis(), extension)
    }

    pub fn to_key(&self) -> String {
        format!("{}/{}.{}", self.product_id, self.timestamp_millis, self.extension)
    }
}

/// Text after the last `.` of a file name, as written
///
/// Names without a dot, or ending in one, have no extension.
pub fn file_extension(file_name: &str) -> Option<&str> {
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => Some(ext),
        _ => None,
    }
}
