//! Result shape of a bulk action.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key under which a bulk parent's `previous_state` lists its sub-actions.
pub const SUB_ACTION_IDS: &str = "subActionIds";

/// A target that was applied successfully.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSuccess {
    pub target_id: String,
    /// The per-target sub-action, for individual rollback
    pub action_id: String,
    pub result: Value,
}

/// A target whose apply failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkFailure {
    pub target_id: String,
    /// `None` when the sub-action could not even be recorded
    pub action_id: Option<String>,
    pub error: String,
}

/// Per-target outcomes of a bulk action, stored as the parent's `result`.
///
/// A non-empty `failed` list is a partial failure, not an error: the parent
/// action still reaches `executed`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkResult {
    pub succeeded: Vec<BulkSuccess>,
    pub failed: Vec<BulkFailure>,
}

impl BulkResult {
    pub fn is_partial_failure(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn succeeded_targets(&self) -> Vec<&str> {
        self.succeeded.iter().map(|s| s.target_id.as_str()).collect()
    }

    pub fn failed_targets(&self) -> Vec<&str> {
        self.failed.iter().map(|f| f.target_id.as_str()).collect()
    }

    /// Ids of every recorded sub-action, successes first.
    pub fn sub_action_ids(&self) -> Vec<&str> {
        self.succeeded
            .iter()
            .map(|s| s.action_id.as_str())
            .chain(self.failed.iter().filter_map(|f| f.action_id.as_deref()))
            .collect()
    }
}
