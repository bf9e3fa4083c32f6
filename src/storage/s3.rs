//! S3 storage client for product images
//!
//! Every image is written with a `public-read` ACL so the listing page can link to
//! it directly.
//!
//! ## Folder Structure
//! ```text
//! {bucket}/
//! └── {product_id}/
//!     └── {timestamp_millis}.{ext}
//! ```

use async_trait::async_trait;
use aws_config::SdkConfig;
use bytes::Bytes;
use aws_sdk_s3::{
    config::Builder,
    error::DisplayErrorContext,
    primitives::ByteStream,
    types::ObjectCannedAcl,
    Client as S3Client,
};
use tracing::{debug, info, instrument};

use super::{object_url, ImageStore, StorageError, StoredImage};
use crate::config::{AwsSettings, StorageSettings};

/// S3 client for product image storage
#[derive(Clone)]
pub struct S3ImageStore {
    client: S3Client,
    bucket: String,
    public_url_base: String,
}

impl S3ImageStore {
    /// Create a new S3 image store from the shared SDK configuration
    pub fn new(sdk_config: &SdkConfig, aws: &AwsSettings, storage: &StorageSettings) -> Self {
        // Custom endpoints (LocalStack, MinIO) only resolve path-style buckets
        let config = Builder::from(sdk_config)
            .force_path_style(aws.endpoint_url.is_some())
            .build();

        let public_url_base = public_url_base(aws, storage);
        debug!("S3 image store publishing under {}", public_url_base);

        Self {
            client: S3Client::from_conf(config),
            bucket: storage.bucket_name.clone(),
            public_url_base,
        }
    }

    /// Get the bucket name
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Get the public URL for an object key
    pub fn public_url(&self, key: &str) -> String {
        object_url(&self.public_url_base, key)
    }
}

#[async_trait]
impl ImageStore for S3ImageStore {
    #[instrument(skip(self, data), fields(bucket = %self.bucket, size = data.len()))]
    async fn upload(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<StoredImage, StorageError> {
        let size = data.len() as u64;

        debug!("Uploading {} bytes to S3: {}", size, key);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| StorageError::Upload(DisplayErrorContext(&e).to_string()))?;

        info!("Uploaded to S3: {} ({} bytes)", key, size);

        Ok(StoredImage {
            key: key.to_string(),
            size,
            public_url: self.public_url(key),
        })
    }

    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::RemoveObject(DisplayErrorContext(&e).to_string()))?;

        info!("Deleted from S3: {}", key);
        Ok(())
    }
}

/// Base URL objects are publicly reachable under
///
/// An explicit prefix wins; a custom endpoint is addressed path-style; otherwise
/// the regional virtual-hosted form is used.
fn public_url_base(aws: &AwsSettings, storage: &StorageSettings) -> String {
    if let Some(ref prefix) = storage.public_url_prefix {
        return prefix.trim_end_matches('/').to_string();
    }

    match aws.endpoint_url {
        Some(ref endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), storage.bucket_name),
        None => format!("https://{}.s3.{}.amazonaws.com", storage.bucket_name, aws.region),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    #[test]
    fn test_virtual_hosted_url() {
        let settings = Settings::default();
        let base = public_url_base(&settings.aws, &settings.storage);
        assert_eq!(base, "https://products-images.s3.us-east-1.amazonaws.com");
        assert_eq!(
            object_url(&base, "sku-1/1700000000000.png"),
            "https://products-images.s3.us-east-1.amazonaws.com/sku-1/1700000000000.png"
        );
    }

    #[test]
    fn test_prefix_and_endpoint_urls() {
        let mut settings = Settings::default();
        settings.aws.endpoint_url = Some("http://localhost:4566/".to_string());
        assert_eq!(
            public_url_base(&settings.aws, &settings.storage),
            "http://localhost:4566/products-images"
        );

        settings.storage.public_url_prefix = Some("https://cdn.example.com/".to_string());
        assert_eq!(
            public_url_base(&settings.aws, &settings.storage),
            "https://cdn.example.com"
        );
    }
}
