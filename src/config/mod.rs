//! Configuration module for the inventory service

use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};
use std::path::PathBuf;

/// Main application settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub aws: AwsSettings,
    pub storage: StorageSettings,
    pub upload: UploadSettings,
    pub views: ViewSettings,
    pub assets: AssetSettings,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// AWS connection settings shared by the DynamoDB and S3 clients
#[derive(Debug, Clone, Deserialize)]
pub struct AwsSettings {
    pub region: String,
    /// Static credentials; the default provider chain is used when either is empty
    #[serde(default)]
    pub access_key_id: String,
    #[serde(default)]
    pub secret_access_key: String,
    /// Custom endpoint (LocalStack, MinIO, ...)
    pub endpoint_url: Option<String>,
    pub operation_timeout_secs: Option<u64>,
}

impl AwsSettings {
    /// True when both halves of a static key pair are configured
    pub fn has_static_credentials(&self) -> bool {
        !self.access_key_id.is_empty() && !self.secret_access_key.is_empty()
    }
}

/// Which backend pair serves products and images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Aws,
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Aws => "aws",
            StorageBackend::Memory => "memory",
        }
    }
}

/// Product table and image bucket
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub table_name: String,
    pub bucket_name: String,
    /// Overrides the virtual-hosted S3 URL used for uploaded images
    pub public_url_prefix: Option<String>,
}

/// Multipart limits for product submissions
#[derive(Debug, Clone, Deserialize)]
pub struct UploadSettings {
    pub max_file_size: usize,
    pub max_field_size: usize,
}

/// Template directory overriding the built-in views
#[derive(Debug, Clone, Deserialize)]
pub struct ViewSettings {
    pub path: PathBuf,
}

/// Static files served under /static
#[derive(Debug, Clone, Deserialize)]
pub struct AssetSettings {
    pub static_dir: PathBuf,
}

/// Flat variable names from the original deployment, mapped onto settings keys
const LEGACY_ENV: &[(&str, &str)] = &[
    ("PORT", "server.port"),
    ("REGION", "aws.region"),
    ("ACCESS_KEY_ID", "aws.access_key_id"),
    ("SECRET_ACCESS_KEY", "aws.secret_access_key"),
    ("DYNAMO_TABLE_NAME", "storage.table_name"),
    ("S3_BUCKET_NAME", "storage.bucket_name"),
];

impl Settings {
    /// Load configuration from files and environment variables
    ///
    /// Configuration priority (highest to lowest):
    /// 1. Flat deployment variables (PORT, REGION, DYNAMO_TABLE_NAME, ...)
    /// 2. Environment variables (prefixed with INVENTORY__)
    /// 3. config/local.toml (gitignored)
    /// 4. config/default.toml
    /// 5. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config_dir = std::env::var("CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"));

        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 4000)?
            .set_default("aws.region", "us-east-1")?
            .set_default("aws.access_key_id", "")?
            .set_default("aws.secret_access_key", "")?
            .set_default("storage.backend", "aws")?
            .set_default("storage.table_name", "products")?
            .set_default("storage.bucket_name", "products-images")?
            .set_default("upload.max_file_size", 2_000_000)?
            .set_default("upload.max_field_size", 1_048_576)?
            .set_default("views.path", "templates")?
            .set_default("assets.static_dir", "static")?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add local overrides (gitignored)
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Add environment variables (INVENTORY__SERVER__PORT, etc.)
            .add_source(
                Environment::with_prefix("INVENTORY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
            );

        for (var, key) in LEGACY_ENV {
            let value = std::env::var(var).ok().filter(|v| !v.is_empty());
            builder = builder.set_override_option(*key, value)?;
        }

        builder.build()?.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 4000,
                workers: None,
            },
            aws: AwsSettings {
                region: "us-east-1".to_string(),
                access_key_id: String::new(),
                secret_access_key: String::new(),
                endpoint_url: None,
                operation_timeout_secs: None,
            },
            storage: StorageSettings {
                backend: StorageBackend::Aws,
                table_name: "products".to_string(),
                bucket_name: "products-images".to_string(),
                public_url_prefix: None,
            },
            upload: UploadSettings {
                max_file_size: 2_000_000,
                max_field_size: 1_048_576,
            },
            views: ViewSettings {
                path: PathBuf::from("templates"),
            },
            assets: AssetSettings {
                static_dir: PathBuf::from("static"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits_match_upload_policy() {
        let settings = Settings::default();
        assert_eq!(settings.upload.max_file_size, 2_000_000);
        assert_eq!(settings.storage.backend, StorageBackend::Aws);
    }

    #[test]
    fn test_static_credentials_need_both_halves() {
        let mut aws = Settings::default().aws;
        assert!(!aws.has_static_credentials());
        aws.access_key_id = "AKIA".to_string();
        assert!(!aws.has_static_credentials());
        aws.secret_access_key = "secret".to_string();
        assert!(aws.has_static_credentials());
    }

    #[test]
    fn test_backend_deserializes_lowercase() {
        let backend: StorageBackend = serde_json::from_str("\"memory\"").unwrap();
        assert_eq!(backend, StorageBackend::Memory);
        assert_eq!(backend.as_str(), "memory");
    }
}
