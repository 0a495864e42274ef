use std::sync::Arc;

use serde_json::{Value, json};

use customfly_application::CustomflyEngine;
use customfly_core::action::{Action, ActionStatus, ActionTarget, BulkResult, NewAction};
use customfly_core::config::EngineSettings;
use customfly_core::session::Session;
use customfly_core::store::{
    AssetStore, AssetType, ConfigStore, DesignElement, DesignPage, DesignStore, Fields, NewAsset,
};
use customfly_execution::LiveStores;
use customfly_infrastructure::{InMemoryAssetStore, InMemoryConfigStore, InMemoryDesignStore};

const SHOP: &str = "demo.myshopify.com";

struct Harness {
    engine: CustomflyEngine,
    configs: Arc<InMemoryConfigStore>,
    assets: Arc<InMemoryAssetStore>,
    designs: Arc<InMemoryDesignStore>,
    session: Session,
}

impl Harness {
    async fn new() -> Self {
        let configs = Arc::new(InMemoryConfigStore::new());
        let assets = Arc::new(InMemoryAssetStore::new());
        let designs = Arc::new(InMemoryDesignStore::new());
        let stores = LiveStores {
            configs: configs.clone(),
            assets: assets.clone(),
            designs: designs.clone(),
        };
        let engine = CustomflyEngine::in_memory(EngineSettings::default(), stores);
        let session = engine.sessions.start_session(SHOP, "merchant").await.unwrap();
        Self {
            engine,
            configs,
            assets,
            designs,
            session,
        }
    }

    async fn propose(&self, kind: &str, target: ActionTarget, payload: Value) -> Action {
        self.engine
            .actions
            .propose(NewAction::new(&self.session.id, SHOP, kind, target, payload))
            .await
            .unwrap()
    }

    async fn run(&self, kind: &str, target: &str, payload: Value) -> Action {
        let action = self
            .propose(kind, ActionTarget::Single(target.into()), payload)
            .await;
        self.engine.actions.execute(&action.id).await.unwrap()
    }

    async fn config_fields(&self, product_id: &str) -> Fields {
        self.configs
            .get_config(SHOP, product_id)
            .await
            .unwrap()
            .map(|c| c.fields)
            .unwrap_or_default()
    }

    async fn seed_config(&self, product_id: &str, fields: Value) {
        let fields = fields.as_object().cloned().unwrap();
        self.configs
            .upsert_config(SHOP, product_id, &fields)
            .await
            .unwrap();
    }
}

fn object(value: Value) -> Fields {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
async fn test_partial_update_leaves_unmentioned_fields() {
    let h = Harness::new().await;
    h.seed_config(
        "P1",
        json!({ "paperSize": "A4", "unit": "cm", "allowUpload": true, "maxColors": 4 }),
    )
    .await;

    h.run("update_config", "P1", json!({ "unit": "mm" })).await;

    assert_eq!(
        h.config_fields("P1").await,
        object(json!({ "paperSize": "A4", "unit": "mm", "allowUpload": true, "maxColors": 4 }))
    );
}

#[tokio::test]
async fn test_rollback_restores_snapshot_and_nothing_else() {
    let h = Harness::new().await;
    h.seed_config("P1", json!({ "paperSize": "A4", "unit": "cm" })).await;

    let action = h
        .run("update_config", "P1", json!({ "unit": "mm", "bleed": 3 }))
        .await;
    assert_eq!(action.previous_state, Some(json!({ "unit": "cm", "bleed": null })));

    let rolled_back = h.engine.actions.rollback(&action.id).await.unwrap();
    assert_eq!(rolled_back.status, ActionStatus::RolledBack);
    assert_eq!(rolled_back.result, action.result);
    assert_eq!(
        h.config_fields("P1").await,
        object(json!({ "paperSize": "A4", "unit": "cm" }))
    );
}

#[tokio::test]
async fn test_rollback_of_asset_creation_deletes_it() {
    let h = Harness::new().await;
    let action = h
        .run(
            "create_asset",
            "Summer Palette",
            json!({ "assetType": "color_palette", "data": { "colors": ["#fff"] } }),
        )
        .await;
    assert_eq!(h.assets.list_by_shop(SHOP).await.unwrap().len(), 1);

    h.engine.actions.rollback(&action.id).await.unwrap();
    assert!(h.assets.list_by_shop(SHOP).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rollback_of_element_add_restores_design_exactly() {
    let h = Harness::new().await;
    let design_before = h.designs.get_design(SHOP, "P1").await.unwrap();

    let action = h
        .run(
            "add_element",
            "P1",
            json!({ "element": { "id": "text-1", "type": "text", "content": "Hello" } }),
        )
        .await;
    assert_eq!(h.designs.get_design(SHOP, "P1").await.unwrap()[0].elements.len(), 1);
    assert_eq!(
        h.config_fields("P1").await.get("enabledElementTypes"),
        Some(&json!(["text"]))
    );

    h.engine.actions.rollback(&action.id).await.unwrap();
    assert_eq!(h.designs.get_design(SHOP, "P1").await.unwrap(), design_before);
    assert!(h.configs.get_config(SHOP, "P1").await.unwrap().is_none());
    assert!(h.configs.list_configured_products(SHOP).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rollback_of_element_removal_leaves_config_alone() {
    let h = Harness::new().await;
    let image: DesignElement =
        serde_json::from_value(json!({ "id": "img-1", "type": "image", "src": "logo.png" }))
            .unwrap();
    let mut page = DesignPage::new("front");
    page.elements.push(image);
    h.designs.update_design(SHOP, "P1", vec![page]).await.unwrap();
    let design_before = h.designs.get_design(SHOP, "P1").await.unwrap();

    let action = h
        .run("remove_element", "P1", json!({ "elementId": "img-1" }))
        .await;
    h.engine.actions.rollback(&action.id).await.unwrap();

    assert_eq!(h.designs.get_design(SHOP, "P1").await.unwrap(), design_before);
    assert!(h.configs.get_config(SHOP, "P1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_rolled_back_config_creation_is_not_a_bulk_target() {
    let h = Harness::new().await;
    let action = h.run("update_config", "P9", json!({ "unit": "cm" })).await;
    h.engine.actions.rollback(&action.id).await.unwrap();
    assert!(h.configs.list_configured_products(SHOP).await.unwrap().is_empty());

    let bulk = h
        .propose(
            "bulk_update_config",
            ActionTarget::AllConfigured,
            json!({ "unit": "mm" }),
        )
        .await;
    let err = h.engine.actions.execute(&bulk.id).await.unwrap_err();
    assert!(err.is_validation());
    assert!(h.configs.get_config(SHOP, "P9").await.unwrap().is_none());
}

#[tokio::test]
async fn test_execute_and_rollback_only_from_legal_states() {
    let h = Harness::new().await;
    let action = h
        .propose(
            "update_config",
            ActionTarget::Single("P1".into()),
            json!({ "unit": "mm" }),
        )
        .await;

    // pending: rollback is illegal
    assert!(h.engine.actions.rollback(&action.id).await.unwrap_err().is_invalid_state());

    h.engine.actions.execute(&action.id).await.unwrap();
    // executed: execute is illegal
    assert!(h.engine.actions.execute(&action.id).await.unwrap_err().is_invalid_state());

    h.engine.actions.rollback(&action.id).await.unwrap();
    // rolled_back: both are illegal
    assert!(h.engine.actions.execute(&action.id).await.unwrap_err().is_invalid_state());
    assert!(h.engine.actions.rollback(&action.id).await.unwrap_err().is_invalid_state());
}

#[tokio::test]
async fn test_failed_action_is_terminal() {
    let h = Harness::new().await;
    h.configs.fail_writes_for("P1").await;
    let action = h
        .propose(
            "update_config",
            ActionTarget::Single("P1".into()),
            json!({ "unit": "mm" }),
        )
        .await;

    let err = h.engine.actions.execute(&action.id).await.unwrap_err();
    assert!(err.is_executor());
    assert!(err.has_side_effects());

    let failed = h.engine.actions.get(&action.id).await.unwrap();
    assert_eq!(failed.status, ActionStatus::Failed);
    assert!(failed.result.unwrap()["error"].is_string());
    assert!(h.engine.actions.execute(&action.id).await.unwrap_err().is_invalid_state());
    assert!(h.engine.actions.rollback(&action.id).await.unwrap_err().is_invalid_state());
}

#[tokio::test]
async fn test_missing_target_has_no_side_effects() {
    let h = Harness::new().await;
    let action = h
        .propose(
            "delete_asset",
            ActionTarget::Single("No Such Palette".into()),
            json!({}),
        )
        .await;

    let err = h.engine.actions.execute(&action.id).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(!err.has_side_effects());
    let unchanged = h.engine.actions.get(&action.id).await.unwrap();
    assert_eq!(unchanged.status, ActionStatus::Pending);
    assert!(unchanged.claimed_at.is_none());

    // The released action can be retried
    let err = h.engine.actions.execute(&action.id).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_unknown_kind_is_rejected_at_proposal() {
    let h = Harness::new().await;
    let err = h
        .engine
        .actions
        .propose(NewAction::new(
            &h.session.id,
            SHOP,
            "rename_shop",
            ActionTarget::Single("P1".into()),
            json!({ "name": "x" }),
        ))
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert!(
        h.engine
            .actions
            .history_for_session(&h.session.id)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_bulk_failure_is_isolated_per_target() {
    let h = Harness::new().await;
    h.configs.fail_writes_for("T2").await;
    let action = h
        .propose(
            "bulk_update_config",
            ActionTarget::Many(vec!["T1".into(), "T2".into(), "T3".into()]),
            json!({ "unit": "mm" }),
        )
        .await;

    let parent = h.engine.actions.execute(&action.id).await.unwrap();
    assert_eq!(parent.status, ActionStatus::Executed);

    let outcome: BulkResult = serde_json::from_value(parent.result.unwrap()).unwrap();
    assert_eq!(outcome.succeeded_targets(), vec!["T1", "T3"]);
    assert_eq!(outcome.failed_targets(), vec!["T2"]);
    assert!(outcome.is_partial_failure());

    assert_eq!(h.config_fields("T1").await.get("unit"), Some(&json!("mm")));
    assert_eq!(h.config_fields("T3").await.get("unit"), Some(&json!("mm")));
    assert!(h.config_fields("T2").await.is_empty());

    let failed_sub = outcome.failed[0].action_id.as_deref().unwrap();
    let failed_sub = h.engine.actions.get(failed_sub).await.unwrap();
    assert_eq!(failed_sub.status, ActionStatus::Failed);
}

#[tokio::test]
async fn test_bulk_is_reverted_through_sub_actions() {
    let h = Harness::new().await;
    h.seed_config("T1", json!({ "unit": "cm" })).await;
    h.seed_config("T2", json!({ "unit": "in" })).await;
    let action = h
        .propose(
            "bulk_update_config",
            ActionTarget::AllConfigured,
            json!({ "unit": "mm" }),
        )
        .await;

    let outcome = h
        .engine
        .actions
        .execute_with_targets(&action.id, vec!["T1".into(), "T2".into()])
        .await
        .unwrap();
    for success in &outcome.succeeded {
        h.engine.actions.rollback(&success.action_id).await.unwrap();
    }

    assert_eq!(h.config_fields("T1").await.get("unit"), Some(&json!("cm")));
    assert_eq!(h.config_fields("T2").await.get("unit"), Some(&json!("in")));
}

#[tokio::test]
async fn test_asset_resolution_follows_strategy_order() {
    let h = Harness::new().await;
    let palette = h
        .assets
        .create(NewAsset {
            id: None,
            shop: SHOP.into(),
            name: "Customfly Colors".into(),
            asset_type: AssetType::ColorPalette,
            data: Fields::new(),
        })
        .await
        .unwrap();

    // literal id
    let by_id = h.run("update_asset", &palette.id, json!({ "name": "Renamed" })).await;
    assert_eq!(by_id.result.unwrap()["id"], json!(palette.id));
    h.engine.actions.rollback(&by_id.id).await.unwrap();

    // case difference
    let by_case = h
        .run("update_asset", "customfly colors", json!({ "primary": "#000" }))
        .await;
    assert_eq!(by_case.result.unwrap()["id"], json!(palette.id));

    // substring
    let deleted = h.run("delete_asset", "Colors", json!({})).await;
    assert_eq!(deleted.result, Some(json!({ "deleted": palette.id })));
    assert!(h.assets.find_by_id(&palette.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_success_rate_and_time_saved() {
    let h = Harness::new().await;
    for i in 0..20 {
        let action = h
            .propose(
                "update_config",
                ActionTarget::Single(format!("P{i}")),
                json!({ "unit": "mm" }),
            )
            .await;
        if i < 5 {
            h.engine.actions.execute(&action.id).await.unwrap();
        }
    }

    let stats = h.engine.impact.stats(SHOP).await.unwrap();
    assert_eq!(stats.total_actions, 20);
    assert_eq!(stats.executed_actions, 5);
    assert_eq!(stats.success_rate, 25.0);
    assert_eq!(stats.time_saved_minutes, 25);
    assert_eq!(stats.session_count, 1);
    assert_eq!(stats.active_session_count, 1);

    let empty = h.engine.impact.stats("empty.myshopify.com").await.unwrap();
    assert_eq!(empty.success_rate, 0.0);
}

#[tokio::test]
async fn test_unit_aware_config_update() {
    let h = Harness::new().await;
    let created = h
        .run(
            "update_config",
            "P1",
            json!({
                "paperSize": "Custom",
                "unit": "cm",
                "customPaperDimensions": { "width": 21, "height": 29.7 }
            }),
        )
        .await;
    assert_eq!(
        created.previous_state,
        Some(json!({ "paperSize": null, "unit": null, "customPaperDimensions": null }))
    );
    assert_eq!(
        h.config_fields("P1").await,
        object(json!({
            "paperSize": "Custom",
            "unit": "cm",
            "customPaperDimensions": { "width": 21, "height": 29.7 }
        }))
    );

    let second = h.run("update_config", "P1", json!({ "unit": "mm" })).await;
    assert_eq!(second.previous_state.unwrap()["unit"], json!("cm"));
    assert_eq!(
        h.config_fields("P1").await,
        object(json!({
            "paperSize": "Custom",
            "unit": "mm",
            "customPaperDimensions": { "width": 21, "height": 29.7 }
        }))
    );
}
