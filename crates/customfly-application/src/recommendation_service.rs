//! Proactive recommendations.
//!
//! A recommendation is an ordinary action proposed with
//! [`ActionOrigin::Recommendation`]. Applying one executes it; dismissing
//! one records `dismissed_at` and leaves it `pending` forever.

use std::sync::Arc;

use customfly_core::action::{
    Action, ActionFilter, ActionOrigin, ActionRepository, ActionStatus, NewAction,
};
use customfly_core::error::{CustomflyError, Result};

use crate::action_usecase::ActionUseCase;

#[derive(Clone)]
pub struct RecommendationService {
    actions: Arc<dyn ActionRepository>,
    usecase: ActionUseCase,
}

impl RecommendationService {
    pub fn new(actions: Arc<dyn ActionRepository>, usecase: ActionUseCase) -> Self {
        Self { actions, usecase }
    }

    /// Records a recommendation. The proposal's origin is overridden.
    pub async fn recommend(&self, new_action: NewAction) -> Result<Action> {
        self.usecase
            .propose(new_action.with_origin(ActionOrigin::Recommendation))
            .await
    }

    /// Executes a recommendation the merchant accepted.
    pub async fn apply(&self, action_id: &str) -> Result<Action> {
        self.ensure_recommendation(action_id).await?;
        self.usecase.execute(action_id).await
    }

    /// Marks a pending recommendation as dismissed.
    ///
    /// # Errors
    ///
    /// - `InvalidState`: already executed, failed or dismissed
    pub async fn dismiss(&self, action_id: &str) -> Result<Action> {
        self.ensure_recommendation(action_id).await?;
        let dismissed = self.actions.mark_dismissed(action_id).await?;
        tracing::info!(
            target: "customfly::recommendation",
            action_id = %dismissed.id,
            "Recommendation dismissed"
        );
        Ok(dismissed)
    }

    /// Recommendations of a shop still waiting for a decision.
    pub async fn list_pending(&self, shop: &str) -> Result<Vec<Action>> {
        let filter = ActionFilter {
            status: Some(ActionStatus::Pending),
            origin: Some(ActionOrigin::Recommendation),
            ..ActionFilter::top_level()
        };
        let pending = self.actions.list_by_shop(shop, &filter).await?;
        Ok(pending
            .into_iter()
            .filter(|a| a.dismissed_at.is_none())
            .collect())
    }

    async fn ensure_recommendation(&self, action_id: &str) -> Result<Action> {
        let action = self.actions.get(action_id).await?;
        if action.origin != ActionOrigin::Recommendation {
            return Err(CustomflyError::validation(format!(
                "action '{}' is not a recommendation",
                action.id
            )));
        }
        Ok(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use customfly_core::action::ActionTarget;
    use customfly_core::session::{Session, SessionRepository};
    use customfly_core::store::ConfigStore;
    use customfly_execution::{ExecutorRegistry, LiveStores};
    use customfly_infrastructure::{
        InMemoryActionRepository, InMemoryAssetStore, InMemoryConfigStore, InMemoryDesignStore,
        InMemorySessionRepository,
    };
    use serde_json::json;

    const SHOP: &str = "demo.myshopify.com";

    struct Fixture {
        service: RecommendationService,
        configs: Arc<InMemoryConfigStore>,
        session: Session,
    }

    async fn fixture() -> Fixture {
        let actions: Arc<InMemoryActionRepository> = Arc::new(InMemoryActionRepository::new());
        let sessions = Arc::new(InMemorySessionRepository::new());
        let session = Session::start(SHOP, "user-1");
        sessions.save(&session).await.unwrap();
        let configs = Arc::new(InMemoryConfigStore::new());
        let stores = LiveStores {
            configs: configs.clone(),
            assets: Arc::new(InMemoryAssetStore::new()),
            designs: Arc::new(InMemoryDesignStore::new()),
        };
        let usecase = ActionUseCase::new(
            actions.clone(),
            sessions,
            Arc::new(ExecutorRegistry::standard(&stores)),
            configs.clone(),
        );
        Fixture {
            service: RecommendationService::new(actions, usecase),
            configs,
            session,
        }
    }

    fn suggestion(session: &Session) -> NewAction {
        NewAction::new(
            &session.id,
            SHOP,
            "update_config",
            ActionTarget::Single("P1".into()),
            json!({ "paperSize": "A4" }),
        )
        .with_description("Offer A4 as the default paper size")
    }

    #[tokio::test]
    async fn test_apply_executes_recommendation() {
        let fixture = fixture().await;
        let rec = fixture
            .service
            .recommend(suggestion(&fixture.session))
            .await
            .unwrap();
        assert_eq!(rec.origin, ActionOrigin::Recommendation);

        let applied = fixture.service.apply(&rec.id).await.unwrap();
        assert_eq!(applied.status, ActionStatus::Executed);
        let config = fixture.configs.get_config(SHOP, "P1").await.unwrap().unwrap();
        assert_eq!(config.field("paperSize"), Some(&json!("A4")));
    }

    #[tokio::test]
    async fn test_dismissed_recommendation_cannot_be_applied() {
        let fixture = fixture().await;
        let rec = fixture
            .service
            .recommend(suggestion(&fixture.session))
            .await
            .unwrap();
        assert_eq!(fixture.service.list_pending(SHOP).await.unwrap().len(), 1);

        let dismissed = fixture.service.dismiss(&rec.id).await.unwrap();
        assert!(dismissed.dismissed_at.is_some());
        assert_eq!(dismissed.status, ActionStatus::Pending);
        assert!(fixture.service.list_pending(SHOP).await.unwrap().is_empty());

        let err = fixture.service.apply(&rec.id).await.unwrap_err();
        assert!(err.is_invalid_state());
        assert!(fixture.configs.get_config(SHOP, "P1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_assistant_action_is_not_a_recommendation() {
        let fixture = fixture().await;
        let action = fixture
            .service
            .usecase
            .propose(suggestion(&fixture.session))
            .await
            .unwrap();
        let err = fixture.service.dismiss(&action.id).await.unwrap_err();
        assert!(err.is_validation());
    }
}
