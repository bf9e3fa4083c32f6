//! DynamoDB product table
//!
//! Records are stored as plain string attributes. The scan follows
//! `LastEvaluatedKey` until the table is exhausted, so callers always see every row.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_dynamodb::{error::DisplayErrorContext, types::AttributeValue, Client as DynamoClient};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

use super::{ProductTable, StorageError};
use crate::domain::{Product, PRODUCT_ID_ATTR};

const PRODUCT_NAME_ATTR: &str = "productName";
const QUANTITY_ATTR: &str = "quantity";
const URL_IMAGE_ATTR: &str = "urlImage";

type Item = HashMap<String, AttributeValue>;

/// Product table backed by a single DynamoDB table
#[derive(Clone)]
pub struct DynamoProductTable {
    client: DynamoClient,
    table_name: String,
}

impl DynamoProductTable {
    pub fn new(sdk_config: &SdkConfig, table_name: &str) -> Self {
        Self {
            client: DynamoClient::new(sdk_config),
            table_name: table_name.to_string(),
        }
    }

    /// Get the table name
    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

#[async_trait]
impl ProductTable for DynamoProductTable {
    #[instrument(skip(self), fields(table = %self.table_name))]
    async fn scan(&self) -> Result<Vec<Product>, StorageError> {
        let mut products = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let result = self.client
                .scan()
                .table_name(&self.table_name)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| StorageError::Scan(DisplayErrorContext(&e).to_string()))?;

            if let Some(items) = result.items {
                for item in &items {
                    products.push(product_from_item(item)?);
                }
            }

            match result.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        debug!("Scanned {} products", products.len());
        Ok(products)
    }

    #[instrument(skip(self, product), fields(table = %self.table_name, product_id = %product.product_id))]
    async fn put(&self, product: &Product) -> Result<(), StorageError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item_from_product(product)))
            .send()
            .await
            .map_err(|e| StorageError::Put(DisplayErrorContext(&e).to_string()))?;

        info!("Stored product {}", product.product_id);
        Ok(())
    }

    #[instrument(skip(self), fields(table = %self.table_name))]
    async fn delete(&self, product_id: &str) -> Result<(), StorageError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key(PRODUCT_ID_ATTR, AttributeValue::S(product_id.to_string()))
            .send()
            .await
            .map_err(|e| StorageError::Delete(DisplayErrorContext(&e).to_string()))?;

        info!("Deleted product {}", product_id);
        Ok(())
    }
}

fn item_from_product(product: &Product) -> Item {
    let mut item = HashMap::new();
    item.insert(PRODUCT_ID_ATTR.to_string(), AttributeValue::S(product.product_id.clone()));
    item.insert(PRODUCT_NAME_ATTR.to_string(), AttributeValue::S(product.product_name.clone()));
    item.insert(QUANTITY_ATTR.to_string(), AttributeValue::S(product.quantity.clone()));
    if let Some(ref url) = product.url_image {
        item.insert(URL_IMAGE_ATTR.to_string(), AttributeValue::S(url.clone()));
    }
    item
}

fn product_from_item(item: &Item) -> Result<Product, StorageError> {
    let product_id = string_attr(item, PRODUCT_ID_ATTR)
        .ok_or_else(|| StorageError::InvalidRecord(format!("missing {}", PRODUCT_ID_ATTR)))?;

    Ok(Product {
        product_id,
        product_name: string_attr(item, PRODUCT_NAME_ATTR).unwrap_or_default(),
        quantity: string_attr(item, QUANTITY_ATTR).unwrap_or_default(),
        url_image: string_attr(item, URL_IMAGE_ATTR),
    })
}

/// String or numeric attribute as text; other attribute types are ignored
fn string_attr(item: &Item, name: &str) -> Option<String> {
    match item.get(name)? {
        AttributeValue::S(s) | AttributeValue::N(s) => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(url_image: Option<&str>) -> Product {
        Product {
            product_id: "p-1".to_string(),
            product_name: "Desk lamp".to_string(),
            quantity: "7".to_string(),
            url_image: url_image.map(String::from),
        }
    }

    #[test]
    fn test_item_round_trip_keeps_all_attributes() {
        let original = product(Some("https://cdn.example.com/p-1/1.png"));
        let item = item_from_product(&original);
        assert_eq!(item.len(), 4);
        assert_eq!(product_from_item(&item).unwrap(), original);
    }

    #[test]
    fn test_item_without_image_omits_attribute() {
        let item = item_from_product(&product(None));
        assert!(!item.contains_key(URL_IMAGE_ATTR));
    }

    #[test]
    fn test_numeric_quantity_is_read_as_text() {
        let mut item = HashMap::new();
        item.insert(PRODUCT_ID_ATTR.to_string(), AttributeValue::S("p-2".to_string()));
        item.insert(QUANTITY_ATTR.to_string(), AttributeValue::N("12".to_string()));

        let product = product_from_item(&item).unwrap();
        assert_eq!(product.quantity, "12");
        assert_eq!(product.product_name, "");
        assert_eq!(product.url_image, None);
    }

    #[test]
    fn test_item_without_key_is_invalid() {
        let mut item = HashMap::new();
        item.insert(PRODUCT_NAME_ATTR.to_string(), AttributeValue::S("orphan".to_string()));
        assert!(matches!(product_from_item(&item), Err(StorageError::InvalidRecord(_))));
    }
}
