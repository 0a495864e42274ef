//! Action domain model.
//!
//! An [`Action`] is one proposed or applied change to a merchant's
//! configuration, together with its lifecycle status and the snapshot
//! needed to undo it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use uuid::Uuid;

use super::bulk::SUB_ACTION_IDS;
use crate::error::{CustomflyError, Result};

/// Tag identifying which executor handles an action.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActionKind {
    UpdateConfig,
    CreateAsset,
    UpdateAsset,
    DeleteAsset,
    AddElement,
    UpdateElement,
    RemoveElement,
    BulkUpdateConfig,
}

impl ActionKind {
    /// The domain object this kind of action mutates.
    pub fn target_kind(&self) -> TargetKind {
        match self {
            Self::UpdateConfig | Self::BulkUpdateConfig => TargetKind::Configuration,
            Self::CreateAsset | Self::UpdateAsset | Self::DeleteAsset => TargetKind::Asset,
            Self::AddElement | Self::UpdateElement | Self::RemoveElement => {
                TargetKind::ProductDesign
            }
        }
    }

    /// Whether this kind fans out across several targets.
    pub fn is_bulk(&self) -> bool {
        matches!(self, Self::BulkUpdateConfig)
    }

    /// Every known tag, in declaration order.
    pub fn all() -> Vec<ActionKind> {
        Self::iter().collect()
    }
}

/// What domain object an action affects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TargetKind {
    Configuration,
    Asset,
    ProductDesign,
}

/// Lifecycle status of an action.
///
/// Legal transitions: `Pending -> Executed -> RolledBack` and
/// `Pending -> Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActionStatus {
    Pending,
    Executed,
    RolledBack,
    Failed,
}

impl ActionStatus {
    /// Returns true if `self -> next` is a legal transition.
    pub fn can_transition_to(&self, next: ActionStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Executed)
                | (Self::Pending, Self::Failed)
                | (Self::Executed, Self::RolledBack)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::RolledBack | Self::Failed)
    }
}

/// Where a proposal came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActionOrigin {
    /// Proposed in response to a chat message.
    #[default]
    Assistant,
    /// Proactive recommendation surfaced without a prompt.
    Recommendation,
}

/// The target(s) of an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ActionTarget {
    /// One product id or asset id/name.
    Single(String),
    /// An explicit list of product ids (bulk kinds).
    Many(Vec<String>),
    /// Every product that already has a configuration record (bulk kinds).
    AllConfigured,
}

impl ActionTarget {
    /// The single target id, if this target names exactly one.
    pub fn single_id(&self) -> Option<&str> {
        match self {
            Self::Single(id) => Some(id.as_str()),
            Self::Many(ids) if ids.len() == 1 => Some(ids[0].as_str()),
            _ => None,
        }
    }
}

/// A persisted record of one proposed or applied change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    /// Unique action identifier (UUID format)
    pub id: String,
    /// Owning session
    pub session_id: String,
    /// Shop domain, denormalized from the session
    pub shop: String,
    pub kind: ActionKind,
    pub target_kind: TargetKind,
    pub target: ActionTarget,
    /// The structured change request
    pub payload: Value,
    pub status: ActionStatus,
    /// New state as applied, or `{ "error": ... }` for failed actions
    pub result: Option<Value>,
    /// State overwritten by execution; rollback reapplies it
    pub previous_state: Option<Value>,
    /// Human-readable summary supplied with the proposal
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub origin: ActionOrigin,
    /// Set on per-target sub-actions spawned by a bulk action
    #[serde(default)]
    pub parent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub executed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rolled_back_at: Option<DateTime<Utc>>,
    /// Set when a recommendation was dismissed instead of applied
    #[serde(default)]
    pub dismissed_at: Option<DateTime<Utc>>,
    /// Set while an execution holds this pending action; cleared by the
    /// next status transition or by releasing the claim
    #[serde(default)]
    pub claimed_at: Option<DateTime<Utc>>,
}

impl Action {
    /// Fails with `InvalidState` unless the action can be executed.
    pub fn ensure_executable(&self) -> Result<()> {
        if self.status != ActionStatus::Pending {
            return Err(CustomflyError::invalid_state(
                &self.id,
                format!("cannot execute an action in '{}' status", self.status),
            ));
        }
        if self.dismissed_at.is_some() {
            return Err(CustomflyError::invalid_state(
                &self.id,
                "cannot execute a dismissed recommendation",
            ));
        }
        if self.claimed_at.is_some() {
            return Err(CustomflyError::invalid_state(
                &self.id,
                "action is already being executed",
            ));
        }
        Ok(())
    }

    /// Fails with `InvalidState` unless the action can be rolled back.
    pub fn ensure_rollbackable(&self) -> Result<()> {
        if self.status != ActionStatus::Executed {
            return Err(CustomflyError::invalid_state(
                &self.id,
                format!("cannot roll back an action in '{}' status", self.status),
            ));
        }
        Ok(())
    }

    /// Whether this action is a per-target child of a bulk action.
    pub fn is_sub_action(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Ids of the sub-actions this action fanned out to, once executed.
    pub fn sub_action_ids(&self) -> Option<Vec<&str>> {
        let ids = self.previous_state.as_ref()?.get(SUB_ACTION_IDS)?.as_array()?;
        Some(ids.iter().filter_map(Value::as_str).collect())
    }
}

/// A proposal as supplied by the proposal source, before validation.
///
/// `kind` is the raw tag string; it is parsed into an [`ActionKind`] by
/// [`NewAction::into_pending`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAction {
    pub session_id: String,
    pub shop: String,
    pub kind: String,
    pub target: ActionTarget,
    pub payload: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub origin: ActionOrigin,
    #[serde(default)]
    pub parent_id: Option<String>,
}

impl NewAction {
    pub fn new(
        session_id: impl Into<String>,
        shop: impl Into<String>,
        kind: impl Into<String>,
        target: ActionTarget,
        payload: Value,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            shop: shop.into(),
            kind: kind.into(),
            target,
            payload: Some(payload),
            description: None,
            origin: ActionOrigin::Assistant,
            parent_id: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_origin(mut self, origin: ActionOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Validates the proposal and builds a `pending` action.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the kind tag is unknown, the payload is absent
    /// or null, or a single-target kind was given a bulk target.
    pub fn into_pending(self) -> Result<Action> {
        let kind = ActionKind::from_str(&self.kind)
            .map_err(|_| CustomflyError::validation(format!("unknown action kind '{}'", self.kind)))?;

        let payload = match self.payload {
            Some(Value::Null) | None => {
                return Err(CustomflyError::validation("action payload is required"));
            }
            Some(payload) => payload,
        };

        if self.shop.trim().is_empty() {
            return Err(CustomflyError::validation("shop is required"));
        }

        if !kind.is_bulk() && self.target.single_id().is_none() {
            return Err(CustomflyError::validation(format!(
                "action kind '{}' requires a single target",
                kind
            )));
        }

        Ok(Action {
            id: Uuid::new_v4().to_string(),
            session_id: self.session_id,
            shop: self.shop,
            kind,
            target_kind: kind.target_kind(),
            target: self.target,
            payload,
            status: ActionStatus::Pending,
            result: None,
            previous_state: None,
            description: self.description,
            origin: self.origin,
            parent_id: self.parent_id,
            created_at: Utc::now(),
            executed_at: None,
            rolled_back_at: None,
            dismissed_at: None,
            claimed_at: None,
        })
    }
}

/// A status transition together with the data that must be written with it.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    pub status: ActionStatus,
    pub result: Option<Value>,
    pub previous_state: Option<Value>,
    pub at: DateTime<Utc>,
}

impl StatusUpdate {
    pub fn executed(result: Value, previous_state: Value) -> Self {
        Self {
            status: ActionStatus::Executed,
            result: Some(result),
            previous_state: Some(previous_state),
            at: Utc::now(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: ActionStatus::Failed,
            result: Some(serde_json::json!({ "error": message.into() })),
            previous_state: None,
            at: Utc::now(),
        }
    }

    pub fn rolled_back() -> Self {
        Self {
            status: ActionStatus::RolledBack,
            result: None,
            previous_state: None,
            at: Utc::now(),
        }
    }

    /// Applies this update to `action` after checking transition legality.
    ///
    /// `result` and `previous_state` are only overwritten when provided, so a
    /// rollback keeps the historical record of what was applied.
    pub fn apply_to(self, action: &mut Action) -> Result<()> {
        if !action.status.can_transition_to(self.status) {
            return Err(CustomflyError::invalid_state(
                &action.id,
                format!("illegal transition {} -> {}", action.status, self.status),
            ));
        }
        if self.status == ActionStatus::Executed && self.previous_state.is_none() {
            return Err(CustomflyError::validation(
                "an executed action must carry its previous state",
            ));
        }

        action.status = self.status;
        action.claimed_at = None;
        if let Some(result) = self.result {
            action.result = Some(result);
        }
        if let Some(previous) = self.previous_state {
            action.previous_state = Some(previous);
        }
        match self.status {
            ActionStatus::Executed | ActionStatus::Failed => action.executed_at = Some(self.at),
            ActionStatus::RolledBack => action.rolled_back_at = Some(self.at),
            ActionStatus::Pending => {}
        }
        Ok(())
    }
}

/// Filters for shop-wide history queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionFilter {
    pub status: Option<ActionStatus>,
    pub kind: Option<ActionKind>,
    pub origin: Option<ActionOrigin>,
    /// Exclude per-target sub-actions of bulk actions
    pub top_level_only: bool,
}

impl ActionFilter {
    pub fn top_level() -> Self {
        Self {
            top_level_only: true,
            ..Self::default()
        }
    }

    pub fn matches(&self, action: &Action) -> bool {
        self.status.is_none_or(|s| action.status == s)
            && self.kind.is_none_or(|k| action.kind == k)
            && self.origin.is_none_or(|o| action.origin == o)
            && (!self.top_level_only || !action.is_sub_action())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn proposal(kind: &str) -> NewAction {
        NewAction::new(
            "session-1",
            "demo.myshopify.com",
            kind,
            ActionTarget::Single("product-1".into()),
            json!({ "unit": "mm" }),
        )
    }

    #[test]
    fn test_kind_tags_round_trip_through_strings() {
        assert_eq!(ActionKind::BulkUpdateConfig.to_string(), "bulk_update_config");
        assert_eq!(
            ActionKind::from_str("create_asset").unwrap(),
            ActionKind::CreateAsset
        );
        assert_eq!(ActionKind::all().len(), 8);
    }

    #[test]
    fn test_into_pending_builds_pending_action() {
        let action = proposal("update_config").into_pending().unwrap();
        assert_eq!(action.status, ActionStatus::Pending);
        assert_eq!(action.kind, ActionKind::UpdateConfig);
        assert_eq!(action.target_kind, TargetKind::Configuration);
        assert!(action.result.is_none());
        assert!(action.previous_state.is_none());
        assert!(action.executed_at.is_none());
    }

    #[test]
    fn test_into_pending_rejects_unknown_kind() {
        let err = proposal("rename_shop").into_pending().unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_into_pending_rejects_missing_payload() {
        let mut new = proposal("update_config");
        new.payload = None;
        assert!(new.into_pending().unwrap_err().is_validation());

        let mut new = proposal("update_config");
        new.payload = Some(Value::Null);
        assert!(new.into_pending().unwrap_err().is_validation());
    }

    #[test]
    fn test_single_kind_rejects_bulk_target() {
        let mut new = proposal("update_config");
        new.target = ActionTarget::AllConfigured;
        assert!(new.into_pending().unwrap_err().is_validation());
    }

    #[test]
    fn test_status_transitions() {
        use ActionStatus::*;
        assert!(Pending.can_transition_to(Executed));
        assert!(Pending.can_transition_to(Failed));
        assert!(Executed.can_transition_to(RolledBack));
        assert!(!Executed.can_transition_to(Executed));
        assert!(!RolledBack.can_transition_to(Executed));
        assert!(!Failed.can_transition_to(Executed));
        assert!(!Pending.can_transition_to(RolledBack));
    }

    #[test]
    fn test_executed_update_requires_snapshot() {
        let mut action = proposal("update_config").into_pending().unwrap();
        let update = StatusUpdate {
            status: ActionStatus::Executed,
            result: Some(json!({})),
            previous_state: None,
            at: Utc::now(),
        };
        assert!(update.apply_to(&mut action).is_err());
        assert_eq!(action.status, ActionStatus::Pending);
    }

    #[test]
    fn test_rollback_update_keeps_history() {
        let mut action = proposal("update_config").into_pending().unwrap();
        StatusUpdate::executed(json!({ "unit": "mm" }), json!({ "unit": "cm" }))
            .apply_to(&mut action)
            .unwrap();
        StatusUpdate::rolled_back().apply_to(&mut action).unwrap();

        assert_eq!(action.status, ActionStatus::RolledBack);
        assert_eq!(action.result, Some(json!({ "unit": "mm" })));
        assert_eq!(action.previous_state, Some(json!({ "unit": "cm" })));
        assert!(action.rolled_back_at.is_some());
    }

    #[test]
    fn test_claimed_action_is_not_executable_until_transition() {
        let mut action = proposal("update_config").into_pending().unwrap();
        action.claimed_at = Some(Utc::now());
        assert!(action.ensure_executable().unwrap_err().is_invalid_state());

        StatusUpdate::executed(json!({}), json!({}))
            .apply_to(&mut action)
            .unwrap();
        assert!(action.claimed_at.is_none());
    }

    #[test]
    fn test_filter_top_level_excludes_sub_actions() {
        let parent = proposal("update_config").into_pending().unwrap();
        let child = proposal("update_config")
            .with_parent(&parent.id)
            .into_pending()
            .unwrap();
        let filter = ActionFilter::top_level();
        assert!(filter.matches(&parent));
        assert!(!filter.matches(&child));
    }

    #[test]
    fn test_sub_action_ids_read_from_snapshot() {
        let mut action = proposal("update_config").into_pending().unwrap();
        assert!(action.sub_action_ids().is_none());
        action.previous_state = Some(json!({ "subActionIds": ["a1", "a2"] }));
        assert_eq!(action.sub_action_ids(), Some(vec!["a1", "a2"]));
    }
}
