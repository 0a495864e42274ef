//! Single-target execution and rollback.

use std::sync::Arc;

use customfly_core::action::{Action, ActionRepository, StatusUpdate};
use customfly_core::error::{CustomflyError, Result};
use customfly_execution::{Executor, ExecutorRegistry};

/// Errors an executor raises before writing anything. They leave the store
/// untouched, so they are surfaced as-is instead of failing the action.
fn is_rejection(err: &CustomflyError) -> bool {
    err.is_validation() || err.is_not_found()
}

/// The message of an error without the executor wrapper.
pub(crate) fn failure_message(err: &CustomflyError) -> String {
    match err {
        CustomflyError::Executor { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

/// Drives one action through `pending -> executed | failed` and
/// `executed -> rolled_back`.
#[derive(Clone)]
pub struct ExecutionController {
    actions: Arc<dyn ActionRepository>,
    registry: Arc<ExecutorRegistry>,
}

impl ExecutionController {
    pub fn new(actions: Arc<dyn ActionRepository>, registry: Arc<ExecutorRegistry>) -> Self {
        Self { actions, registry }
    }

    /// Executes a single-target action.
    ///
    /// # Errors
    ///
    /// - `NotFound` / `InvalidState` / `UnknownKind`: nothing happened
    /// - `InvalidState` also when another execution already claimed it
    /// - `Validation` / `NotFound` from the executor: rejected before any
    ///   write; the action stays `pending`
    /// - `Executor`: the apply failed and the action is now `failed`
    pub async fn execute(&self, action_id: &str) -> Result<Action> {
        let action = self.actions.get(action_id).await?;
        action.ensure_executable()?;
        let executor = self.registry.get(action.kind)?;
        if executor.member_kind().is_some() {
            return Err(CustomflyError::validation(format!(
                "action kind '{}' targets many products; execute it as a bulk action",
                action.kind
            )));
        }

        let action = self.actions.claim(action_id).await?;
        match self.run(action, executor.as_ref(), false).await {
            Err(err) if is_rejection(&err) => {
                self.actions.release(action_id).await?;
                Err(err)
            }
            outcome => outcome,
        }
    }

    /// Applies `action` and records the outcome.
    ///
    /// With `record_rejections`, pre-write rejections also mark the action
    /// `failed`; bulk sub-actions use this so every target is accounted for.
    pub(crate) async fn run(
        &self,
        action: Action,
        executor: &dyn Executor,
        record_rejections: bool,
    ) -> Result<Action> {
        let target = action.target.single_id().ok_or_else(|| {
            CustomflyError::validation(format!("action '{}' has no single target", action.id))
        })?;

        match executor.apply(&action.shop, target, &action.payload).await {
            Ok(applied) => {
                let executed = self
                    .actions
                    .update_status(
                        &action.id,
                        StatusUpdate::executed(applied.result, applied.previous_state),
                    )
                    .await?;
                tracing::info!(
                    target: "customfly::action",
                    action_id = %executed.id,
                    kind = %executed.kind,
                    shop = %executed.shop,
                    target_id = target,
                    status = "executed",
                    "Action executed"
                );
                Ok(executed)
            }
            Err(err) if is_rejection(&err) && !record_rejections => {
                tracing::info!(
                    target: "customfly::action",
                    action_id = %action.id,
                    error = %err,
                    "Action rejected before apply"
                );
                Err(err)
            }
            Err(err) => {
                let message = failure_message(&err);
                self.actions
                    .update_status(&action.id, StatusUpdate::failed(&message))
                    .await?;
                tracing::warn!(
                    target: "customfly::action",
                    action_id = %action.id,
                    kind = %action.kind,
                    target_id = target,
                    status = "failed",
                    error = %message,
                    "Action failed"
                );
                Err(CustomflyError::executor(&action.id, message))
            }
        }
    }

    /// Rolls back an executed action by reapplying its previous state.
    ///
    /// Changes made by later actions to the same fields are overwritten;
    /// there is no reconciliation between actions.
    ///
    /// # Errors
    ///
    /// - `InvalidState`: the action is not `executed`, or is a bulk parent
    ///   (roll back its sub-actions instead)
    /// - `Executor`: the reapply failed; the action stays `executed`
    pub async fn rollback(&self, action_id: &str) -> Result<Action> {
        let action = self.actions.get(action_id).await?;
        action.ensure_rollbackable()?;
        let executor = self.registry.get(action.kind)?;
        if executor.member_kind().is_some() || action.sub_action_ids().is_some() {
            return Err(CustomflyError::invalid_state(
                &action.id,
                "bulk actions are rolled back through their sub-actions",
            ));
        }

        let previous = action.previous_state.as_ref().ok_or_else(|| {
            CustomflyError::internal(format!("executed action '{}' has no snapshot", action.id))
        })?;
        let target = action.target.single_id().ok_or_else(|| {
            CustomflyError::validation(format!("action '{}' has no single target", action.id))
        })?;

        if let Err(err) = executor.apply(&action.shop, target, previous).await {
            tracing::warn!(
                target: "customfly::action",
                action_id = %action.id,
                error = %err,
                "Rollback failed"
            );
            return Err(if is_rejection(&err) {
                err
            } else {
                CustomflyError::executor(&action.id, err.to_string())
            });
        }

        let rolled_back = self
            .actions
            .update_status(&action.id, StatusUpdate::rolled_back())
            .await?;
        tracing::info!(
            target: "customfly::action",
            action_id = %rolled_back.id,
            kind = %rolled_back.kind,
            status = "rolled_back",
            "Action rolled back"
        );
        Ok(rolled_back)
    }
}
