//! Executor wrapper for kinds that fan out across many targets.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use customfly_core::action::ActionKind;
use customfly_core::error::Result;

use crate::executor::{Applied, Executor};

/// Wraps a single-target executor. The bulk controller spawns one
/// sub-action of `member_kind` per target; each of those runs through the
/// member executor, so no-clobber and snapshot rules are not duplicated.
pub struct BulkExecutor {
    member_kind: ActionKind,
    member: Arc<dyn Executor>,
}

impl BulkExecutor {
    pub fn new(member_kind: ActionKind, member: Arc<dyn Executor>) -> Self {
        Self {
            member_kind,
            member,
        }
    }
}

#[async_trait]
impl Executor for BulkExecutor {
    async fn apply(&self, shop: &str, target_id: &str, payload: &Value) -> Result<Applied> {
        self.member.apply(shop, target_id, payload).await
    }

    fn member_kind(&self) -> Option<ActionKind> {
        Some(self.member_kind)
    }
}
