//! Action use case: the surface the assistant and the admin UI call.
//!
//! Coordinates the action store, session store and the two execution
//! controllers. Kinds are never matched here; the registry decides whether
//! an action fans out.

use std::sync::Arc;

use customfly_core::action::{Action, ActionFilter, ActionRepository, BulkResult, NewAction};
use customfly_core::error::{CustomflyError, Result};
use customfly_core::session::SessionRepository;
use customfly_core::store::ConfigStore;
use customfly_execution::ExecutorRegistry;

use crate::bulk_controller::BulkController;
use crate::execution_controller::ExecutionController;

/// Use case for proposing, executing and rolling back actions.
#[derive(Clone)]
pub struct ActionUseCase {
    actions: Arc<dyn ActionRepository>,
    sessions: Arc<dyn SessionRepository>,
    registry: Arc<ExecutorRegistry>,
    single: ExecutionController,
    bulk: BulkController,
}

impl ActionUseCase {
    pub fn new(
        actions: Arc<dyn ActionRepository>,
        sessions: Arc<dyn SessionRepository>,
        registry: Arc<ExecutorRegistry>,
        configs: Arc<dyn ConfigStore>,
    ) -> Self {
        Self {
            single: ExecutionController::new(actions.clone(), registry.clone()),
            bulk: BulkController::new(actions.clone(), registry.clone(), configs),
            actions,
            sessions,
            registry,
        }
    }

    /// Records a proposal as a `pending` action.
    ///
    /// # Errors
    ///
    /// - `NotFound`: the session does not exist
    /// - `InvalidState`: the session is closed
    /// - `Validation`: the proposal is malformed, or its shop differs from
    ///   the session's
    pub async fn propose(&self, new_action: NewAction) -> Result<Action> {
        let session = self
            .sessions
            .find_by_id(&new_action.session_id)
            .await?
            .ok_or_else(|| CustomflyError::not_found("session", &new_action.session_id))?;

        if !session.is_active() {
            return Err(CustomflyError::invalid_state(
                &session.id,
                "cannot propose actions in a closed session",
            ));
        }
        if session.shop != new_action.shop {
            return Err(CustomflyError::validation(format!(
                "session '{}' belongs to shop '{}', not '{}'",
                session.id, session.shop, new_action.shop
            )));
        }

        let action = self.actions.create(new_action).await?;
        tracing::info!(
            target: "customfly::action",
            action_id = %action.id,
            session_id = %action.session_id,
            kind = %action.kind,
            origin = %action.origin,
            status = "pending",
            "Action proposed"
        );
        Ok(action)
    }

    /// Executes an action, fanning out when its kind is a bulk kind.
    ///
    /// For bulk kinds the per-target outcomes are in the returned action's
    /// `result`; a partial failure still returns `Ok`.
    pub async fn execute(&self, action_id: &str) -> Result<Action> {
        let action = self.actions.get(action_id).await?;
        let executor = self.registry.get(action.kind)?;
        if executor.member_kind().is_some() {
            self.bulk.execute_bulk(action_id, None).await?;
            return self.actions.get(action_id).await;
        }
        self.single.execute(action_id).await
    }

    /// Executes an action against an explicit list of targets.
    ///
    /// The list overrides whatever target the action was proposed with.
    /// Single-target kinds are fanned out with their own kind, one
    /// sub-action per target.
    pub async fn execute_with_targets(
        &self,
        action_id: &str,
        target_ids: Vec<String>,
    ) -> Result<BulkResult> {
        self.bulk.execute_bulk(action_id, Some(target_ids)).await
    }

    /// Rolls back an executed single-target action or bulk sub-action.
    pub async fn rollback(&self, action_id: &str) -> Result<Action> {
        self.single.rollback(action_id).await
    }

    /// Every action of a session, most recent first, sub-actions included.
    pub async fn history_for_session(&self, session_id: &str) -> Result<Vec<Action>> {
        self.actions.list_by_session(session_id).await
    }

    /// Actions of a shop matching `filter`, most recent first.
    pub async fn history_for_shop(&self, shop: &str, filter: &ActionFilter) -> Result<Vec<Action>> {
        self.actions.list_by_shop(shop, filter).await
    }

    pub async fn get(&self, action_id: &str) -> Result<Action> {
        self.actions.get(action_id).await
    }
}
