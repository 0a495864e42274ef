//! Fan-out of bulk actions across many products.

use std::sync::Arc;

use serde_json::json;

use customfly_core::action::{
    Action, ActionKind, ActionRepository, ActionTarget, BulkFailure, BulkResult, BulkSuccess,
    NewAction, SUB_ACTION_IDS, StatusUpdate,
};
use customfly_core::error::{CustomflyError, Result};
use customfly_core::store::ConfigStore;
use customfly_execution::{Executor, ExecutorRegistry};

use crate::execution_controller::{ExecutionController, failure_message};

/// Applies one payload to many targets, isolating per-target failures.
///
/// Each target gets its own sub-action (linked through `parent_id`) so it
/// can be inspected and rolled back on its own. There is no automatic
/// rollback of a whole bulk action.
#[derive(Clone)]
pub struct BulkController {
    actions: Arc<dyn ActionRepository>,
    registry: Arc<ExecutorRegistry>,
    configs: Arc<dyn ConfigStore>,
    single: ExecutionController,
}

impl BulkController {
    pub fn new(
        actions: Arc<dyn ActionRepository>,
        registry: Arc<ExecutorRegistry>,
        configs: Arc<dyn ConfigStore>,
    ) -> Self {
        let single = ExecutionController::new(actions.clone(), registry.clone());
        Self {
            actions,
            registry,
            configs,
            single,
        }
    }

    /// Executes `action_id` against every target and returns the per-target
    /// outcomes. `override_targets` takes priority over the stored target.
    ///
    /// Failures of individual targets are reported in
    /// [`BulkResult::failed`]; the parent still reaches `executed`.
    ///
    /// # Errors
    ///
    /// - `InvalidState`: the parent is not `pending`, or another execution
    ///   already claimed it
    /// - `Validation`: the target list resolves to nothing
    pub async fn execute_bulk(
        &self,
        action_id: &str,
        override_targets: Option<Vec<String>>,
    ) -> Result<BulkResult> {
        let parent = self.actions.get(action_id).await?;
        parent.ensure_executable()?;

        let executor = self.registry.get(parent.kind)?;
        let member_kind = executor.member_kind().unwrap_or(parent.kind);
        let member = self.registry.get(member_kind)?;

        let targets = self.resolve_targets(&parent, override_targets).await?;
        if targets.is_empty() {
            return Err(CustomflyError::validation(format!(
                "bulk action '{}' has no targets",
                parent.id
            )));
        }

        let parent = self.actions.claim(action_id).await?;

        tracing::info!(
            target: "customfly::bulk",
            action_id = %parent.id,
            kind = %parent.kind,
            target_count = targets.len(),
            "Starting bulk execution"
        );

        let mut outcome = BulkResult::default();
        for target_id in targets {
            self.run_target(&parent, member_kind, member.as_ref(), target_id, &mut outcome)
                .await;
        }

        let sub_action_ids: Vec<String> = outcome
            .sub_action_ids()
            .into_iter()
            .map(str::to_string)
            .collect();
        let result = serde_json::to_value(&outcome)?;
        self.actions
            .update_status(
                &parent.id,
                StatusUpdate::executed(result, json!({ SUB_ACTION_IDS: sub_action_ids })),
            )
            .await?;

        tracing::info!(
            target: "customfly::bulk",
            action_id = %parent.id,
            status = "executed",
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            "Bulk execution finished"
        );
        Ok(outcome)
    }

    async fn resolve_targets(
        &self,
        parent: &Action,
        override_targets: Option<Vec<String>>,
    ) -> Result<Vec<String>> {
        let targets = match override_targets {
            Some(ids) => ids,
            None => match &parent.target {
                ActionTarget::Single(id) => vec![id.clone()],
                ActionTarget::Many(ids) => ids.clone(),
                ActionTarget::AllConfigured => {
                    self.configs.list_configured_products(&parent.shop).await?
                }
            },
        };

        let mut unique: Vec<String> = Vec::with_capacity(targets.len());
        for id in targets {
            let id = id.trim().to_string();
            if !id.is_empty() && !unique.contains(&id) {
                unique.push(id);
            }
        }
        Ok(unique)
    }

    async fn run_target(
        &self,
        parent: &Action,
        member_kind: ActionKind,
        member: &dyn Executor,
        target_id: String,
        outcome: &mut BulkResult,
    ) {
        let mut proposal = NewAction::new(
            &parent.session_id,
            &parent.shop,
            member_kind.to_string(),
            ActionTarget::Single(target_id.clone()),
            parent.payload.clone(),
        )
        .with_origin(parent.origin)
        .with_parent(&parent.id);
        proposal.description = parent.description.clone();

        let sub_action = match self.actions.create(proposal).await {
            Ok(action) => action,
            Err(err) => {
                tracing::warn!(
                    target: "customfly::bulk",
                    action_id = %parent.id,
                    target_id = %target_id,
                    error = %err,
                    "Could not record sub-action"
                );
                outcome.failed.push(BulkFailure {
                    target_id,
                    action_id: None,
                    error: err.to_string(),
                });
                return;
            }
        };

        let sub_action_id = sub_action.id.clone();
        match self.single.run(sub_action, member, true).await {
            Ok(executed) => outcome.succeeded.push(BulkSuccess {
                target_id,
                action_id: executed.id,
                result: executed.result.unwrap_or_default(),
            }),
            Err(err) => outcome.failed.push(BulkFailure {
                target_id,
                action_id: Some(sub_action_id),
                error: failure_message(&err),
            }),
        }
    }
}
