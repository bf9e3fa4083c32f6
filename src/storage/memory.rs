//! In-process backends for running without AWS
//!
//! Selected with `storage.backend = "memory"`. Nothing survives a restart. Stored
//! images are served back by the `/images` route.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashMap;

use super::{object_url, ImageStore, ProductTable, StorageError, StoredImage};
use crate::domain::Product;

/// Product table held in a concurrent map
#[derive(Default)]
pub struct MemoryProductTable {
    rows: DashMap<String, Product>,
}

impl MemoryProductTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn get(&self, product_id: &str) -> Option<Product> {
        self.rows.get(product_id).map(|row| row.value().clone())
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl ProductTable for MemoryProductTable {
    async fn scan(&self) -> Result<Vec<Product>, StorageError> {
        Ok(self.rows.iter().map(|row| row.value().clone()).collect())
    }

    async fn put(&self, product: &Product) -> Result<(), StorageError> {
        self.rows.insert(product.product_id.clone(), product.clone());
        Ok(())
    }

    async fn delete(&self, product_id: &str) -> Result<(), StorageError> {
        self.rows.remove(product_id);
        Ok(())
    }
}

/// An object held by [`MemoryImageStore`]
#[derive(Debug, Clone)]
pub struct MemoryObject {
    pub data: Bytes,
    pub content_type: String,
}

/// Image bucket held in memory
pub struct MemoryImageStore {
    objects: RwLock<HashMap<String, MemoryObject>>,
    public_url_base: String,
}

impl MemoryImageStore {
    pub fn new(public_url_base: &str) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            public_url_base: public_url_base.trim_end_matches('/').to_string(),
        }
    }

    /// Look up a stored object by its exact key
    pub fn get(&self, key: &str) -> Option<MemoryObject> {
        self.objects.read().get(key).cloned()
    }

    #[cfg(test)]
    pub fn keys(&self) -> Vec<String> {
        self.objects.read().keys().cloned().collect()
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn upload(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<StoredImage, StorageError> {
        let size = data.len() as u64;
        self.objects.write().insert(
            key.to_string(),
            MemoryObject {
                data,
                content_type: content_type.to_string(),
            },
        );

        Ok(StoredImage {
            key: key.to_string(),
            size,
            public_url: object_url(&self.public_url_base, key),
        })
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.objects.write().remove(key);
        Ok(())
    }
}
