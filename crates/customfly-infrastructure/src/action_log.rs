//! Storage-agnostic collection of action records.
//!
//! Both the in-memory and the JSON file repository keep their records in an
//! [`ActionLog`], so validation, transition checks and ordering are identical.

use serde::{Deserialize, Serialize};

use customfly_core::action::{Action, ActionFilter, ActionStatus, NewAction, StatusUpdate};
use customfly_core::error::{CustomflyError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionLog {
    /// Records in insertion order
    actions: Vec<Action>,
}

impl ActionLog {
    pub fn insert(&mut self, new_action: NewAction) -> Result<Action> {
        let action = new_action.into_pending()?;
        self.actions.push(action.clone());
        Ok(action)
    }

    pub fn find(&self, action_id: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.id == action_id)
    }

    fn find_mut(&mut self, action_id: &str) -> Result<&mut Action> {
        self.actions
            .iter_mut()
            .find(|a| a.id == action_id)
            .ok_or_else(|| CustomflyError::not_found("action", action_id))
    }

    /// Applies a status update; on error the record is left unchanged.
    pub fn update_status(&mut self, action_id: &str, update: StatusUpdate) -> Result<Action> {
        let action = self.find_mut(action_id)?;
        let mut updated = action.clone();
        update.apply_to(&mut updated)?;
        *action = updated.clone();
        Ok(updated)
    }

    /// Checks executability and sets the claim in one step.
    pub fn claim(&mut self, action_id: &str) -> Result<Action> {
        let action = self.find_mut(action_id)?;
        action.ensure_executable()?;
        action.claimed_at = Some(chrono::Utc::now());
        Ok(action.clone())
    }

    /// No-op for actions that already moved past pending.
    pub fn release(&mut self, action_id: &str) -> Result<Action> {
        let action = self.find_mut(action_id)?;
        if action.status == ActionStatus::Pending {
            action.claimed_at = None;
        }
        Ok(action.clone())
    }

    pub fn mark_dismissed(&mut self, action_id: &str) -> Result<Action> {
        let action = self.find_mut(action_id)?;
        action.ensure_executable()?;
        action.dismissed_at = Some(chrono::Utc::now());
        Ok(action.clone())
    }

    /// Returns matching records, newest first.
    pub fn select<P>(&self, predicate: P) -> Vec<Action>
    where
        P: Fn(&Action) -> bool,
    {
        let mut selected: Vec<Action> = self
            .actions
            .iter()
            .rev()
            .filter(|a| predicate(a))
            .cloned()
            .collect();
        // Stable sort keeps reverse insertion order for equal timestamps
        selected.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        selected
    }

    pub fn by_session(&self, session_id: &str) -> Vec<Action> {
        self.select(|a| a.session_id == session_id)
    }

    pub fn by_shop(&self, shop: &str, filter: &ActionFilter) -> Vec<Action> {
        self.select(|a| a.shop == shop && filter.matches(a))
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
