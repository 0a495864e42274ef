//! Executor for named asset groups (color palettes, font groups, ...).

use async_trait::async_trait;
use serde_json::{Value, json};
use std::str::FromStr;
use std::sync::Arc;
use strum::{Display, EnumString};

use customfly_core::error::{CustomflyError, Result};
use customfly_core::store::{Asset, AssetStore, Fields, NewAsset};

use crate::executor::{Applied, Executor, payload_fields, snapshot, str_entry, update_fields};
use crate::resolver::resolve_asset;

/// What an asset payload does. Carried in the payload's `op` key; when
/// absent, the executor's registered default applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum AssetOperation {
    Create,
    Update,
    Delete,
}

pub struct AssetExecutor {
    assets: Arc<dyn AssetStore>,
    default_op: AssetOperation,
}

impl AssetExecutor {
    pub fn new(assets: Arc<dyn AssetStore>, default_op: AssetOperation) -> Self {
        Self { assets, default_op }
    }

    fn operation(&self, fields: &Fields) -> Result<AssetOperation> {
        match str_entry(fields, "op")? {
            Some(op) => AssetOperation::from_str(op)
                .map_err(|_| CustomflyError::validation(format!("unknown asset op '{}'", op))),
            None => Ok(self.default_op),
        }
    }

    /// Resolves the asset addressed by the payload's `id`, falling back to
    /// the action's target reference.
    async fn resolve(&self, shop: &str, target: &str, fields: &Fields) -> Result<Asset> {
        let reference = str_entry(fields, "id")?.unwrap_or(target);
        let (asset, _) = resolve_asset(self.assets.as_ref(), shop, reference).await?;
        Ok(asset)
    }

    /// Fails with `Validation` when another asset of the shop already uses
    /// `name`. `owner` is the asset being renamed, if any.
    async fn ensure_name_free(&self, shop: &str, name: &str, owner: Option<&str>) -> Result<()> {
        match self.assets.find_by_exact_name(shop, name).await? {
            Some(existing) if Some(existing.id.as_str()) != owner => Err(
                CustomflyError::validation(format!("asset '{}' already exists", name)),
            ),
            _ => Ok(()),
        }
    }

    /// Keys other than `id`, `name`, `assetType` and `data` are folded into
    /// `data`, the same addressing [`Asset::apply_fields`] uses. Entries of
    /// an explicit `data` object win over folded ones.
    async fn create(&self, shop: &str, target: &str, fields: &Fields) -> Result<Applied> {
        let mut body = Fields::new();
        let mut data = Fields::new();
        let mut explicit_data = Fields::new();
        for (key, value) in fields {
            match key.as_str() {
                "op" | "shop" => {}
                "id" | "name" | "assetType" => {
                    body.insert(key.clone(), value.clone());
                }
                "data" => {
                    let entries = value.as_object().ok_or_else(|| {
                        CustomflyError::validation("asset data must be an object")
                    })?;
                    explicit_data = entries.clone();
                }
                _ => {
                    data.insert(key.clone(), value.clone());
                }
            }
        }
        data.extend(explicit_data);
        body.insert("shop".into(), Value::String(shop.to_string()));
        body.insert("data".into(), Value::Object(data));
        if !body.contains_key("name") {
            body.insert("name".into(), Value::String(target.to_string()));
        }

        let new_asset: NewAsset = serde_json::from_value(Value::Object(body))
            .map_err(|e| CustomflyError::validation(format!("invalid asset definition: {}", e)))?;
        if new_asset.name.trim().is_empty() {
            return Err(CustomflyError::validation("asset name is required"));
        }
        self.ensure_name_free(shop, &new_asset.name, None).await?;

        let asset = self.assets.create(new_asset).await?;
        Ok(Applied {
            result: serde_json::to_value(&asset)?,
            previous_state: json!({ "op": "delete", "id": asset.id }),
        })
    }

    async fn update(&self, shop: &str, target: &str, fields: &Fields) -> Result<Applied> {
        let changes = update_fields(fields, &["op", "id"])?;
        let asset = self.resolve(shop, target, fields).await?;
        if let Some(name) = changes.get("name").and_then(Value::as_str) {
            self.ensure_name_free(shop, name, Some(&asset.id)).await?;
        }
        let previous = snapshot(&changes, |k| asset.field(k));

        let updated = self.assets.update(&asset.id, &changes).await?;
        Ok(Applied {
            result: serde_json::to_value(&updated)?,
            previous_state: json!({ "op": "update", "id": asset.id, "fields": previous }),
        })
    }

    async fn delete(&self, shop: &str, target: &str, fields: &Fields) -> Result<Applied> {
        let asset = self.resolve(shop, target, fields).await?;

        self.assets.delete(&asset.id).await?;
        Ok(Applied {
            result: json!({ "deleted": asset.id }),
            previous_state: json!({
                "op": "create",
                "id": asset.id,
                "name": asset.name,
                "assetType": asset.asset_type,
                "data": asset.data,
            }),
        })
    }
}

#[async_trait]
impl Executor for AssetExecutor {
    async fn apply(&self, shop: &str, target: &str, payload: &Value) -> Result<Applied> {
        let fields = payload_fields(payload)?;
        let op = self.operation(fields)?;

        let applied = match op {
            AssetOperation::Create => self.create(shop, target, fields).await?,
            AssetOperation::Update => self.update(shop, target, fields).await?,
            AssetOperation::Delete => self.delete(shop, target, fields).await?,
        };

        tracing::debug!(
            target: "customfly::executor",
            shop,
            asset = target,
            op = %op,
            "Applied asset change"
        );
        Ok(applied)
    }
}
