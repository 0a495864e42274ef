//! Wiring of repositories, executors and use cases.

use std::sync::Arc;

use customfly_core::action::ActionRepository;
use customfly_core::config::EngineSettings;
use customfly_core::error::Result;
use customfly_core::session::SessionRepository;
use customfly_execution::{ExecutorRegistry, LiveStores};
use customfly_infrastructure::{
    CustomflyPaths, InMemoryActionRepository, InMemorySessionRepository, JsonFileActionRepository,
    SettingsService,
};

use crate::action_usecase::ActionUseCase;
use crate::impact_service::ImpactService;
use crate::recommendation_service::RecommendationService;
use crate::session_service::SessionService;

/// The assembled engine. Cheap to clone; every part shares the same stores.
#[derive(Clone)]
pub struct CustomflyEngine {
    pub settings: EngineSettings,
    pub actions: ActionUseCase,
    pub sessions: SessionService,
    pub recommendations: RecommendationService,
    pub impact: ImpactService,
}

impl CustomflyEngine {
    /// Builds an engine over explicit repositories.
    pub fn new(
        settings: EngineSettings,
        stores: LiveStores,
        action_repository: Arc<dyn ActionRepository>,
        session_repository: Arc<dyn SessionRepository>,
    ) -> Self {
        let registry = Arc::new(ExecutorRegistry::standard(&stores));
        let actions = ActionUseCase::new(
            action_repository.clone(),
            session_repository.clone(),
            registry,
            stores.configs.clone(),
        );

        Self {
            sessions: SessionService::new(session_repository.clone()),
            recommendations: RecommendationService::new(action_repository.clone(), actions.clone()),
            impact: ImpactService::new(
                action_repository,
                session_repository,
                settings.minutes_per_action,
            ),
            actions,
            settings,
        }
    }

    /// Engine with in-memory action and session records.
    pub fn in_memory(settings: EngineSettings, stores: LiveStores) -> Self {
        Self::new(
            settings,
            stores,
            Arc::new(InMemoryActionRepository::new()),
            Arc::new(InMemorySessionRepository::new()),
        )
    }

    /// Loads settings from `config.toml` and opens the durable action log.
    ///
    /// Sessions are kept in memory; actions survive restarts.
    pub fn open(paths: &CustomflyPaths, stores: LiveStores) -> Result<Self> {
        let settings = SettingsService::with_path(paths.config_file()?).get_settings()?;
        let log_file = paths.action_log_file(settings.data_dir.as_ref())?;
        tracing::info!(
            target: "customfly::engine",
            action_log = %log_file.display(),
            minutes_per_action = settings.minutes_per_action,
            "Opening engine"
        );

        Ok(Self::new(
            settings,
            stores,
            Arc::new(JsonFileActionRepository::new(log_file)),
            Arc::new(InMemorySessionRepository::new()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use customfly_core::action::{ActionStatus, ActionTarget, NewAction};
    use customfly_infrastructure::{InMemoryAssetStore, InMemoryConfigStore, InMemoryDesignStore};
    use serde_json::json;
    use tempfile::TempDir;

    fn stores() -> LiveStores {
        LiveStores {
            configs: Arc::new(InMemoryConfigStore::new()),
            assets: Arc::new(InMemoryAssetStore::new()),
            designs: Arc::new(InMemoryDesignStore::new()),
        }
    }

    #[tokio::test]
    async fn test_open_creates_default_settings_and_persists_actions() {
        let temp = TempDir::new().unwrap();
        let paths = CustomflyPaths::new(Some(temp.path().to_path_buf()));

        let engine = CustomflyEngine::open(&paths, stores()).unwrap();
        assert_eq!(engine.settings, EngineSettings::default());
        assert!(paths.config_file().unwrap().exists());

        let session = engine
            .sessions
            .start_session("demo.myshopify.com", "u1")
            .await
            .unwrap();
        let action = engine
            .actions
            .propose(NewAction::new(
                &session.id,
                "demo.myshopify.com",
                "update_config",
                ActionTarget::Single("P1".into()),
                json!({ "unit": "mm" }),
            ))
            .await
            .unwrap();
        engine.actions.execute(&action.id).await.unwrap();

        let reopened = CustomflyEngine::open(&paths, stores()).unwrap();
        let stored = reopened.actions.get(&action.id).await.unwrap();
        assert_eq!(stored.status, ActionStatus::Executed);
        assert!(paths.action_log_file(None).unwrap().exists());
    }
}
