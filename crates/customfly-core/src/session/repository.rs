//! Session repository trait.

use super::model::{Session, SessionStatus};
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for managing session persistence.
///
/// Sessions are never deleted through this interface.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Finds a session by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Session))`: Session found
    /// - `Ok(None)`: Session not found
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>>;

    /// Saves a new session.
    async fn save(&self, session: &Session) -> Result<()>;

    /// Updates the status of an existing session.
    ///
    /// # Returns
    ///
    /// - `Err(NotFound)`: No session with this ID
    async fn set_status(&self, session_id: &str, status: SessionStatus) -> Result<Session>;

    /// Lists the sessions of a shop, most recent first.
    async fn list_by_shop(&self, shop: &str) -> Result<Vec<Session>>;
}
