//! Action repository trait.
//!
//! Defines the interface for the action record store.

use async_trait::async_trait;

use super::model::{Action, ActionFilter, NewAction, StatusUpdate};
use crate::error::{CustomflyError, Result};

/// An abstract store for action records and their lifecycle.
///
/// This trait decouples the controllers from the specific storage mechanism
/// (in-memory, JSON files, database).
///
/// # Implementation Notes
///
/// Implementations must:
/// - Validate proposals via [`NewAction::into_pending`] and persist nothing
///   when validation fails
/// - Write status, result and snapshot of a [`StatusUpdate`] as one unit
/// - Reject illegal transitions (see [`StatusUpdate::apply_to`])
/// - Check and set the execution claim in one step, so that two concurrent
///   executions of the same action cannot both pass [`ActionRepository::claim`]
#[async_trait]
pub trait ActionRepository: Send + Sync {
    /// Validates and persists a new proposal in `pending` status.
    ///
    /// # Returns
    ///
    /// - `Ok(Action)`: The stored action
    /// - `Err(Validation)`: Unknown kind or missing payload; nothing stored
    async fn create(&self, new_action: NewAction) -> Result<Action>;

    /// Finds an action by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Action))`: Action found
    /// - `Ok(None)`: Action not found
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_id(&self, action_id: &str) -> Result<Option<Action>>;

    /// Transitions an action's status together with its result and snapshot.
    ///
    /// This is the only mutation path after creation.
    async fn update_status(&self, action_id: &str, update: StatusUpdate) -> Result<Action>;

    /// Marks a pending action as being executed.
    ///
    /// # Returns
    ///
    /// - `Ok(Action)`: The claimed action; the caller may now apply it
    /// - `Err(InvalidState)`: Not pending, dismissed, or already claimed
    async fn claim(&self, action_id: &str) -> Result<Action>;

    /// Drops the claim of an action that is still pending.
    async fn release(&self, action_id: &str) -> Result<Action>;

    /// Records that a recommendation was dismissed. Only valid while pending.
    async fn mark_dismissed(&self, action_id: &str) -> Result<Action>;

    /// Lists the actions of one session, newest first.
    async fn list_by_session(&self, session_id: &str) -> Result<Vec<Action>>;

    /// Lists the actions of one shop matching `filter`, newest first.
    async fn list_by_shop(&self, shop: &str, filter: &ActionFilter) -> Result<Vec<Action>>;

    /// Loads an action, failing with `NotFound` if it does not exist.
    async fn get(&self, action_id: &str) -> Result<Action> {
        self.find_by_id(action_id)
            .await?
            .ok_or_else(|| CustomflyError::not_found("action", action_id))
    }
}
