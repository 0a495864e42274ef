//! Shop-scoped named asset groups (color palettes, font groups, ...).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use super::config::{Fields, merge_fields};
use crate::error::{CustomflyError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AssetType {
    ColorPalette,
    FontGroup,
    ShapeGroup,
    ImageGroup,
}

/// A named, typed asset group belonging to one shop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub shop: String,
    pub name: String,
    pub asset_type: AssetType,
    /// Type-specific definition (`colors`, `fonts`, ...)
    pub data: Fields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    /// Reads a field by its payload name.
    ///
    /// `name` and `assetType` address the top-level columns; every other
    /// key addresses `data`. Returns `None` when the field is unset.
    pub fn field(&self, key: &str) -> Option<Value> {
        match key {
            "name" => Some(Value::String(self.name.clone())),
            "assetType" => Some(Value::String(self.asset_type.to_string())),
            _ => self.data.get(key).cloned(),
        }
    }

    /// Applies a partial update using the same addressing as [`Asset::field`].
    ///
    /// # Errors
    ///
    /// Returns `Validation` when `id`/`shop` are addressed, `name` is not a
    /// non-empty string, or `assetType` is not a known type.
    pub fn apply_fields(&mut self, fields: &Fields) -> Result<()> {
        let mut data = Fields::new();
        for (key, value) in fields {
            match key.as_str() {
                "id" | "shop" => {
                    return Err(CustomflyError::validation(format!(
                        "asset field '{}' cannot be changed",
                        key
                    )));
                }
                "name" => {
                    self.name = value
                        .as_str()
                        .filter(|s| !s.trim().is_empty())
                        .ok_or_else(|| CustomflyError::validation("asset name must be a string"))?
                        .to_string();
                }
                "assetType" => {
                    self.asset_type = value
                        .as_str()
                        .and_then(|s| s.parse().ok())
                        .ok_or_else(|| {
                            CustomflyError::validation(format!("unknown asset type {}", value))
                        })?;
                }
                _ => {
                    data.insert(key.clone(), value.clone());
                }
            }
        }
        merge_fields(&mut self.data, &data);
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Input for creating an asset. `id` is kept when recreating a deleted asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAsset {
    #[serde(default)]
    pub id: Option<String>,
    pub shop: String,
    pub name: String,
    pub asset_type: AssetType,
    #[serde(default)]
    pub data: Fields,
}

/// Store of asset groups.
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn find_by_id(&self, asset_id: &str) -> Result<Option<Asset>>;

    /// Exact, case-sensitive name lookup within a shop.
    async fn find_by_exact_name(&self, shop: &str, name: &str) -> Result<Option<Asset>>;

    /// All assets of a shop, oldest first (used for fuzzy fallback).
    async fn list_by_shop(&self, shop: &str) -> Result<Vec<Asset>>;

    async fn create(&self, new_asset: NewAsset) -> Result<Asset>;

    /// Applies a partial update; see [`Asset::apply_fields`].
    async fn update(&self, asset_id: &str, fields: &Fields) -> Result<Asset>;

    /// Deletes an asset, returning `NotFound` if it does not exist.
    async fn delete(&self, asset_id: &str) -> Result<()>;
}
