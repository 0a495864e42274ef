//! Executor for per-shop, per-product configuration records.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use customfly_core::error::{CustomflyError, Result};
use customfly_core::store::{ConfigStore, Fields};

use crate::executor::{Applied, Executor, payload_fields, snapshot};

/// Merges a partial field set into a product configuration record,
/// creating the record on demand.
pub struct ConfigurationExecutor {
    configs: Arc<dyn ConfigStore>,
}

impl ConfigurationExecutor {
    pub fn new(configs: Arc<dyn ConfigStore>) -> Self {
        Self { configs }
    }
}

#[async_trait]
impl Executor for ConfigurationExecutor {
    async fn apply(&self, shop: &str, product_id: &str, payload: &Value) -> Result<Applied> {
        let changes = payload_fields(payload)?;
        if changes.is_empty() {
            return Err(CustomflyError::validation(
                "configuration payload has no fields",
            ));
        }

        let current = self.configs.get_config(shop, product_id).await?;
        let previous = snapshot(changes, |k| {
            current.as_ref().and_then(|c| c.field(k).cloned())
        });

        let record = self.configs.upsert_config(shop, product_id, changes).await?;
        let applied: Fields = snapshot(changes, |k| record.field(k).cloned());

        tracing::debug!(
            target: "customfly::executor",
            shop,
            product_id,
            fields = changes.len(),
            created = current.is_none(),
            "Applied configuration fields"
        );

        Ok(Applied {
            result: Value::Object(applied),
            previous_state: Value::Object(previous),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use customfly_infrastructure::InMemoryConfigStore;
    use serde_json::json;

    const SHOP: &str = "demo.myshopify.com";

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    fn executor() -> (ConfigurationExecutor, Arc<InMemoryConfigStore>) {
        let store = Arc::new(InMemoryConfigStore::new());
        (ConfigurationExecutor::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_creates_record_on_demand() {
        let (executor, store) = executor();
        let payload = json!({
            "paperSize": "Custom",
            "unit": "cm",
            "customPaperDimensions": { "width": 21, "height": 29.7 }
        });

        let applied = executor.apply(SHOP, "p1", &payload).await.unwrap();

        let record = store.get_config(SHOP, "p1").await.unwrap().unwrap();
        assert_eq!(record.fields, fields(payload.clone()));
        assert_eq!(applied.result, payload);
        assert_eq!(
            applied.previous_state,
            json!({ "paperSize": null, "unit": null, "customPaperDimensions": null })
        );
    }

    #[tokio::test]
    async fn test_never_touches_unmentioned_fields() {
        let (executor, store) = executor();
        store
            .upsert_config(SHOP, "p1", &fields(json!({ "unit": "cm", "dpi": 300, "bleed": 3 })))
            .await
            .unwrap();

        let applied = executor
            .apply(SHOP, "p1", &json!({ "unit": "mm" }))
            .await
            .unwrap();

        let record = store.get_config(SHOP, "p1").await.unwrap().unwrap();
        assert_eq!(record.fields, fields(json!({ "unit": "mm", "dpi": 300, "bleed": 3 })));
        assert_eq!(applied.previous_state, json!({ "unit": "cm" }));
    }

    #[tokio::test]
    async fn test_reapplying_snapshot_restores_state() {
        let (executor, store) = executor();
        store
            .upsert_config(SHOP, "p1", &fields(json!({ "unit": "cm" })))
            .await
            .unwrap();
        let before = store.get_config(SHOP, "p1").await.unwrap().unwrap().fields;

        let applied = executor
            .apply(SHOP, "p1", &json!({ "unit": "mm", "paperSize": "A3" }))
            .await
            .unwrap();
        executor
            .apply(SHOP, "p1", &applied.previous_state)
            .await
            .unwrap();

        let after = store.get_config(SHOP, "p1").await.unwrap().unwrap().fields;
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn test_rolling_back_a_creation_removes_the_record() {
        let (executor, store) = executor();

        let applied = executor
            .apply(SHOP, "p9", &json!({ "unit": "cm" }))
            .await
            .unwrap();
        assert_eq!(store.list_configured_products(SHOP).await.unwrap(), vec!["p9"]);

        executor
            .apply(SHOP, "p9", &applied.previous_state)
            .await
            .unwrap();
        assert!(store.get_config(SHOP, "p9").await.unwrap().is_none());
        assert!(store.list_configured_products(SHOP).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_non_object_payload() {
        let (executor, store) = executor();
        let err = executor.apply(SHOP, "p1", &json!(["unit"])).await.unwrap_err();
        assert!(err.is_validation());
        assert!(store.get_config(SHOP, "p1").await.unwrap().is_none());

        let err = executor.apply(SHOP, "p1", &json!({})).await.unwrap_err();
        assert!(err.is_validation());
    }
}
