//! JSON-file-backed ActionRepository implementation.
//!
//! All records live in a single `actions.json` document that is rewritten
//! atomically (tmp file + rename) under an exclusive file lock, so a crash
//! never leaves a half-written status without its snapshot.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::sync::Mutex;

use customfly_core::action::{Action, ActionFilter, ActionRepository, NewAction, StatusUpdate};
use customfly_core::error::{CustomflyError, Result};

use crate::action_log::ActionLog;
use crate::storage::AtomicFile;

/// Durable action log stored as one JSON file.
pub struct JsonFileActionRepository {
    file: AtomicFile<ActionLog>,
    /// Serializes writers within this process
    write_guard: Mutex<()>,
}

impl JsonFileActionRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicFile::json(path),
            write_guard: Mutex::new(()),
        }
    }

    fn read(&self) -> Result<ActionLog> {
        Ok(self.file.load()?.unwrap_or_default())
    }

    async fn modify<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut ActionLog) -> Result<R>,
    {
        let _guard = self.write_guard.lock().await;
        self.file
            .update(ActionLog::default(), f)
            .map_err(|e: CustomflyError| {
                tracing::debug!(
                    target: "customfly::store",
                    path = %self.file.path().display(),
                    error = %e,
                    "Action log update rejected"
                );
                e
            })
    }
}

#[async_trait]
impl ActionRepository for JsonFileActionRepository {
    async fn create(&self, new_action: NewAction) -> Result<Action> {
        self.modify(|log| log.insert(new_action)).await
    }

    async fn find_by_id(&self, action_id: &str) -> Result<Option<Action>> {
        Ok(self.read()?.find(action_id).cloned())
    }

    async fn update_status(&self, action_id: &str, update: StatusUpdate) -> Result<Action> {
        self.modify(|log| log.update_status(action_id, update)).await
    }

    async fn claim(&self, action_id: &str) -> Result<Action> {
        self.modify(|log| log.claim(action_id)).await
    }

    async fn release(&self, action_id: &str) -> Result<Action> {
        self.modify(|log| log.release(action_id)).await
    }

    async fn mark_dismissed(&self, action_id: &str) -> Result<Action> {
        self.modify(|log| log.mark_dismissed(action_id)).await
    }

    async fn list_by_session(&self, session_id: &str) -> Result<Vec<Action>> {
        Ok(self.read()?.by_session(session_id))
    }

    async fn list_by_shop(&self, shop: &str, filter: &ActionFilter) -> Result<Vec<Action>> {
        Ok(self.read()?.by_shop(shop, filter))
    }
}
