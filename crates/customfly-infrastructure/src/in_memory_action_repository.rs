//! In-memory ActionRepository implementation.

use async_trait::async_trait;
use tokio::sync::RwLock;

use customfly_core::action::{Action, ActionFilter, ActionRepository, NewAction, StatusUpdate};
use customfly_core::error::Result;

use crate::action_log::ActionLog;

/// Action record store held in process memory.
///
/// Used by tests and by embedders that persist actions elsewhere.
#[derive(Debug, Default)]
pub struct InMemoryActionRepository {
    log: RwLock<ActionLog>,
}

impl InMemoryActionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, including bulk sub-actions.
    pub async fn len(&self) -> usize {
        self.log.read().await.len()
    }
}

#[async_trait]
impl ActionRepository for InMemoryActionRepository {
    async fn create(&self, new_action: NewAction) -> Result<Action> {
        self.log.write().await.insert(new_action)
    }

    async fn find_by_id(&self, action_id: &str) -> Result<Option<Action>> {
        Ok(self.log.read().await.find(action_id).cloned())
    }

    async fn update_status(&self, action_id: &str, update: StatusUpdate) -> Result<Action> {
        self.log.write().await.update_status(action_id, update)
    }

    async fn claim(&self, action_id: &str) -> Result<Action> {
        self.log.write().await.claim(action_id)
    }

    async fn release(&self, action_id: &str) -> Result<Action> {
        self.log.write().await.release(action_id)
    }

    async fn mark_dismissed(&self, action_id: &str) -> Result<Action> {
        self.log.write().await.mark_dismissed(action_id)
    }

    async fn list_by_session(&self, session_id: &str) -> Result<Vec<Action>> {
        Ok(self.log.read().await.by_session(session_id))
    }

    async fn list_by_shop(&self, shop: &str, filter: &ActionFilter) -> Result<Vec<Action>> {
        Ok(self.log.read().await.by_shop(shop, filter))
    }
}
