//! Registry mapping action kinds to their executors.

use std::collections::HashMap;
use std::sync::Arc;

use customfly_core::action::ActionKind;
use customfly_core::error::{CustomflyError, Result};
use customfly_core::store::{AssetStore, ConfigStore, DesignStore};

use crate::asset::{AssetExecutor, AssetOperation};
use crate::bulk::BulkExecutor;
use crate::configuration::ConfigurationExecutor;
use crate::design::{DesignOperation, ProductDesignExecutor};
use crate::executor::Executor;

/// The live stores executors read and write.
#[derive(Clone)]
pub struct LiveStores {
    pub configs: Arc<dyn ConfigStore>,
    pub assets: Arc<dyn AssetStore>,
    pub designs: Arc<dyn DesignStore>,
}

/// Executors keyed by action kind, built once at startup.
///
/// Adding a kind means registering one more executor; controllers look
/// executors up here and never match on kinds themselves.
#[derive(Clone, Default)]
pub struct ExecutorRegistry {
    executors: HashMap<ActionKind, Arc<dyn Executor>>,
}

impl ExecutorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every built-in kind against `stores`.
    pub fn standard(stores: &LiveStores) -> Self {
        let configuration: Arc<dyn Executor> =
            Arc::new(ConfigurationExecutor::new(stores.configs.clone()));
        let asset = |op: AssetOperation| -> Arc<dyn Executor> {
            Arc::new(AssetExecutor::new(stores.assets.clone(), op))
        };
        let design = |op: DesignOperation| -> Arc<dyn Executor> {
            Arc::new(ProductDesignExecutor::new(
                stores.designs.clone(),
                stores.configs.clone(),
                op,
            ))
        };

        Self::new()
            .with(ActionKind::UpdateConfig, configuration.clone())
            .with(ActionKind::CreateAsset, asset(AssetOperation::Create))
            .with(ActionKind::UpdateAsset, asset(AssetOperation::Update))
            .with(ActionKind::DeleteAsset, asset(AssetOperation::Delete))
            .with(ActionKind::AddElement, design(DesignOperation::Add))
            .with(ActionKind::UpdateElement, design(DesignOperation::Update))
            .with(ActionKind::RemoveElement, design(DesignOperation::Remove))
            .with(
                ActionKind::BulkUpdateConfig,
                Arc::new(BulkExecutor::new(ActionKind::UpdateConfig, configuration)),
            )
    }

    /// Registers (or replaces) the executor for `kind`.
    pub fn register(&mut self, kind: ActionKind, executor: Arc<dyn Executor>) {
        self.executors.insert(kind, executor);
    }

    pub fn with(mut self, kind: ActionKind, executor: Arc<dyn Executor>) -> Self {
        self.register(kind, executor);
        self
    }

    /// Looks up the executor for `kind`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownKind` when nothing is registered for `kind`.
    pub fn get(&self, kind: ActionKind) -> Result<Arc<dyn Executor>> {
        self.executors
            .get(&kind)
            .cloned()
            .ok_or_else(|| CustomflyError::UnknownKind(kind.to_string()))
    }

    pub fn contains(&self, kind: ActionKind) -> bool {
        self.executors.contains_key(&kind)
    }
}
