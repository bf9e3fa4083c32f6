//! Storage module for products and their images
//!
//! Products live in a single flat DynamoDB table keyed by `productId`; images live
//! in an S3 bucket as public objects. Both sit behind traits so the routes can run
//! against the in-memory backends during local development and tests.

mod dynamo;
mod memory;
mod s3;

use async_trait::async_trait;
use bytes::Bytes;
use aws_config::{timeout::TimeoutConfig, BehaviorVersion, SdkConfig};
use aws_sdk_s3::config::{Credentials, Region};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::AwsSettings;
use crate::domain::Product;

pub use dynamo::DynamoProductTable;
pub use memory::{MemoryImageStore, MemoryProductTable};
pub use s3::S3ImageStore;

/// Characters left as-is in a key segment (RFC 3986 unreserved)
const KEY_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Errors that can occur while talking to either backend
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Scan failed: {0}")]
    Scan(String),

    #[error("Put failed: {0}")]
    Put(String),

    #[error("Delete failed: {0}")]
    Delete(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Object removal failed: {0}")]
    RemoveObject(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

/// Table of product records
#[async_trait]
pub trait ProductTable: Send + Sync {
    /// Read every record in the table
    async fn scan(&self) -> Result<Vec<Product>, StorageError>;

    /// Insert or replace the record with the same `productId`
    async fn put(&self, product: &Product) -> Result<(), StorageError>;

    /// Remove a record; removing a missing id succeeds
    async fn delete(&self, product_id: &str) -> Result<(), StorageError>;
}

/// Result of an image upload
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub key: String,
    pub size: u64,
    pub public_url: String,
}

/// Bucket of publicly readable product images
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store bytes under `key` with public-read visibility
    async fn upload(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<StoredImage, StorageError>;

    /// Delete the object under `key`; used to clean up after a failed table write
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Append an object key to a public base URL, percent-encoding each segment
pub(crate) fn object_url(base: &str, key: &str) -> String {
    let encoded: Vec<String> = key
        .split('/')
        .map(|segment| utf8_percent_encode(segment, KEY_SEGMENT).to_string())
        .collect();
    format!("{}/{}", base, encoded.join("/"))
}

/// Build the shared AWS configuration both clients are created from
///
/// Static credentials are used when configured, otherwise the default provider
/// chain (environment, profile, instance metadata) applies.
pub async fn load_sdk_config(settings: &AwsSettings) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(settings.region.clone()));

    if settings.has_static_credentials() {
        let credentials = Credentials::new(
            &settings.access_key_id,
            &settings.secret_access_key,
            None, // session token
            None, // expiry
            "inventory-static-credentials",
        );
        loader = loader.credentials_provider(credentials);
    }

    if let Some(ref endpoint) = settings.endpoint_url {
        debug!("Using custom AWS endpoint: {}", endpoint);
        loader = loader.endpoint_url(endpoint);
    }

    if let Some(secs) = settings.operation_timeout_secs {
        loader = loader.timeout_config(
            TimeoutConfig::builder()
                .operation_timeout(Duration::from_secs(secs))
                .build(),
        );
    }

    loader.load().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_segments_are_encoded() {
        assert_eq!(
            object_url("https://cdn.example.com", "blue chair/1.png"),
            "https://cdn.example.com/blue%20chair/1.png"
        );
        assert_eq!(
            object_url("/images", "a+b/2.gif"),
            "/images/a%2Bb/2.gif"
        );
        assert_eq!(object_url("/images", "sku-1/17.png"), "/images/sku-1/17.png");
    }
}
