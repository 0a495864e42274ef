//! Per-shop, per-product configuration records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// A partial set of named fields.
pub type Fields = Map<String, Value>;

/// Configuration record of one product in one shop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductConfig {
    pub shop: String,
    pub product_id: String,
    /// Configurator settings keyed by field name (`paperSize`, `unit`, ...)
    pub fields: Fields,
    pub updated_at: DateTime<Utc>,
}

impl ProductConfig {
    pub fn empty(shop: impl Into<String>, product_id: impl Into<String>) -> Self {
        Self {
            shop: shop.into(),
            product_id: product_id.into(),
            fields: Fields::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Merges `partial` into `target`.
///
/// Keys absent from `partial` are left untouched; a `null` value removes the
/// key from `target`.
pub fn merge_fields(target: &mut Fields, partial: &Fields) {
    for (key, value) in partial {
        if value.is_null() {
            target.remove(key);
        } else {
            target.insert(key.clone(), value.clone());
        }
    }
}

/// Store of product configuration records.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Returns the configuration of a product, if one exists.
    async fn get_config(&self, shop: &str, product_id: &str) -> Result<Option<ProductConfig>>;

    /// Merges `fields` into the product's configuration, creating the record
    /// when missing. Semantics follow [`merge_fields`].
    ///
    /// A record left without fields is deleted, so clearing every field a
    /// previous upsert introduced also removes the product from
    /// [`ConfigStore::list_configured_products`].
    async fn upsert_config(
        &self,
        shop: &str,
        product_id: &str,
        fields: &Fields,
    ) -> Result<ProductConfig>;

    /// Product ids of the shop that have a configuration record.
    async fn list_configured_products(&self, shop: &str) -> Result<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_merge_leaves_unmentioned_fields() {
        let mut target = fields(json!({ "unit": "cm", "paperSize": "A4" }));
        merge_fields(&mut target, &fields(json!({ "unit": "mm" })));
        assert_eq!(target, fields(json!({ "unit": "mm", "paperSize": "A4" })));
    }

    #[test]
    fn test_merge_null_removes_field() {
        let mut target = fields(json!({ "unit": "cm", "paperSize": "A4" }));
        merge_fields(&mut target, &fields(json!({ "paperSize": null })));
        assert_eq!(target, fields(json!({ "unit": "cm" })));
    }
}
