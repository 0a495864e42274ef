//! In-memory implementations of the live configuration, asset and design
//! stores.
//!
//! Each store can be told to reject writes for a given key, which lets tests
//! simulate a downstream store failing mid-apply.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

use customfly_core::error::{CustomflyError, Result};
use customfly_core::store::{
    Asset, AssetStore, ConfigStore, DesignPage, DesignStore, Fields, NewAsset, ProductConfig,
    merge_fields,
};

type ShopProduct = (String, String);

fn key(shop: &str, product_id: &str) -> ShopProduct {
    (shop.to_string(), product_id.to_string())
}

// ============================================================================
// Configuration store
// ============================================================================

#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    records: RwLock<BTreeMap<ShopProduct, ProductConfig>>,
    failing_products: RwLock<HashSet<String>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every write to `product_id` fail with a data access error.
    pub async fn fail_writes_for(&self, product_id: impl Into<String>) {
        self.failing_products.write().await.insert(product_id.into());
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn get_config(&self, shop: &str, product_id: &str) -> Result<Option<ProductConfig>> {
        Ok(self.records.read().await.get(&key(shop, product_id)).cloned())
    }

    async fn upsert_config(
        &self,
        shop: &str,
        product_id: &str,
        fields: &Fields,
    ) -> Result<ProductConfig> {
        if self.failing_products.read().await.contains(product_id) {
            return Err(CustomflyError::data_access(format!(
                "configuration store rejected write for product '{}'",
                product_id
            )));
        }

        let mut records = self.records.write().await;
        let mut record = records
            .get(&key(shop, product_id))
            .cloned()
            .unwrap_or_else(|| ProductConfig::empty(shop, product_id));
        merge_fields(&mut record.fields, fields);
        record.updated_at = Utc::now();

        if record.fields.is_empty() {
            records.remove(&key(shop, product_id));
        } else {
            records.insert(key(shop, product_id), record.clone());
        }
        Ok(record)
    }

    async fn list_configured_products(&self, shop: &str) -> Result<Vec<String>> {
        Ok(self
            .records
            .read()
            .await
            .keys()
            .filter(|(s, _)| s == shop)
            .map(|(_, product_id)| product_id.clone())
            .collect())
    }
}

// ============================================================================
// Asset store
// ============================================================================

#[derive(Debug, Default)]
pub struct InMemoryAssetStore {
    /// Assets in creation order
    assets: RwLock<Vec<Asset>>,
    failing_assets: RwLock<HashSet<String>>,
}

impl InMemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes updates and deletes of `asset_id` fail with a data access error.
    pub async fn fail_writes_for(&self, asset_id: impl Into<String>) {
        self.failing_assets.write().await.insert(asset_id.into());
    }

    async fn check_writable(&self, asset_id: &str) -> Result<()> {
        if self.failing_assets.read().await.contains(asset_id) {
            return Err(CustomflyError::data_access(format!(
                "asset store rejected write for asset '{}'",
                asset_id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl AssetStore for InMemoryAssetStore {
    async fn find_by_id(&self, asset_id: &str) -> Result<Option<Asset>> {
        Ok(self
            .assets
            .read()
            .await
            .iter()
            .find(|a| a.id == asset_id)
            .cloned())
    }

    async fn find_by_exact_name(&self, shop: &str, name: &str) -> Result<Option<Asset>> {
        Ok(self
            .assets
            .read()
            .await
            .iter()
            .find(|a| a.shop == shop && a.name == name)
            .cloned())
    }

    async fn list_by_shop(&self, shop: &str) -> Result<Vec<Asset>> {
        Ok(self
            .assets
            .read()
            .await
            .iter()
            .filter(|a| a.shop == shop)
            .cloned()
            .collect())
    }

    async fn create(&self, new_asset: NewAsset) -> Result<Asset> {
        let mut assets = self.assets.write().await;
        let id = new_asset
            .id
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        if assets.iter().any(|a| a.id == id) {
            return Err(CustomflyError::data_access(format!(
                "asset '{}' already exists",
                id
            )));
        }

        let now = Utc::now();
        let asset = Asset {
            id,
            shop: new_asset.shop,
            name: new_asset.name,
            asset_type: new_asset.asset_type,
            data: new_asset.data,
            created_at: now,
            updated_at: now,
        };
        assets.push(asset.clone());
        Ok(asset)
    }

    async fn update(&self, asset_id: &str, fields: &Fields) -> Result<Asset> {
        self.check_writable(asset_id).await?;
        let mut assets = self.assets.write().await;
        let asset = assets
            .iter_mut()
            .find(|a| a.id == asset_id)
            .ok_or_else(|| CustomflyError::not_found("asset", asset_id))?;

        let mut updated = asset.clone();
        updated.apply_fields(fields)?;
        *asset = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, asset_id: &str) -> Result<()> {
        self.check_writable(asset_id).await?;
        let mut assets = self.assets.write().await;
        let before = assets.len();
        assets.retain(|a| a.id != asset_id);
        if assets.len() == before {
            return Err(CustomflyError::not_found("asset", asset_id));
        }
        Ok(())
    }
}

// ============================================================================
// Design store
// ============================================================================

#[derive(Debug, Default)]
pub struct InMemoryDesignStore {
    designs: RwLock<HashMap<ShopProduct, Vec<DesignPage>>>,
}

impl InMemoryDesignStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DesignStore for InMemoryDesignStore {
    async fn get_design(&self, shop: &str, product_id: &str) -> Result<Vec<DesignPage>> {
        Ok(self
            .designs
            .read()
            .await
            .get(&key(shop, product_id))
            .cloned()
            .unwrap_or_default())
    }

    async fn update_design(
        &self,
        shop: &str,
        product_id: &str,
        pages: Vec<DesignPage>,
    ) -> Result<()> {
        let mut designs = self.designs.write().await;
        if pages.is_empty() {
            designs.remove(&key(shop, product_id));
        } else {
            designs.insert(key(shop, product_id), pages);
        }
        Ok(())
    }
}
