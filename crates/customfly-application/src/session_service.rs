//! Assistant session lifecycle.

use std::sync::Arc;

use customfly_core::error::{CustomflyError, Result};
use customfly_core::session::{Session, SessionRepository, SessionStatus};

/// Opens and closes the sessions actions are proposed in.
#[derive(Clone)]
pub struct SessionService {
    sessions: Arc<dyn SessionRepository>,
}

impl SessionService {
    pub fn new(sessions: Arc<dyn SessionRepository>) -> Self {
        Self { sessions }
    }

    /// Returns the active session of `user_id` in `shop`, starting one if
    /// none is open.
    pub async fn start_session(&self, shop: &str, user_id: &str) -> Result<Session> {
        if shop.trim().is_empty() {
            return Err(CustomflyError::validation("shop is required"));
        }

        let existing = self
            .sessions
            .list_by_shop(shop)
            .await?
            .into_iter()
            .find(|s| s.user_id == user_id && s.is_active());
        if let Some(session) = existing {
            tracing::debug!(
                target: "customfly::session",
                session_id = %session.id,
                "Resuming active session"
            );
            return Ok(session);
        }

        let session = Session::start(shop, user_id);
        self.sessions.save(&session).await?;
        tracing::info!(
            target: "customfly::session",
            session_id = %session.id,
            shop = %session.shop,
            "Session started"
        );
        Ok(session)
    }

    /// Closes a session. Closed sessions accept no further proposals; their
    /// actions can still be executed and rolled back.
    pub async fn close_session(&self, session_id: &str) -> Result<Session> {
        let session = self
            .sessions
            .set_status(session_id, SessionStatus::Closed)
            .await?;
        tracing::info!(
            target: "customfly::session",
            session_id = %session.id,
            "Session closed"
        );
        Ok(session)
    }

    pub async fn get(&self, session_id: &str) -> Result<Session> {
        self.sessions
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| CustomflyError::not_found("session", session_id))
    }

    pub async fn list_by_shop(&self, shop: &str) -> Result<Vec<Session>> {
        self.sessions.list_by_shop(shop).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use customfly_infrastructure::InMemorySessionRepository;

    fn service() -> SessionService {
        SessionService::new(Arc::new(InMemorySessionRepository::new()))
    }

    #[tokio::test]
    async fn test_start_session_reuses_active_session() {
        let service = service();
        let first = service.start_session("demo.myshopify.com", "u1").await.unwrap();
        let second = service.start_session("demo.myshopify.com", "u1").await.unwrap();
        assert_eq!(first.id, second.id);

        let other_user = service.start_session("demo.myshopify.com", "u2").await.unwrap();
        assert_ne!(first.id, other_user.id);
    }

    #[tokio::test]
    async fn test_closed_session_is_not_reused() {
        let service = service();
        let first = service.start_session("demo.myshopify.com", "u1").await.unwrap();
        let closed = service.close_session(&first.id).await.unwrap();
        assert_eq!(closed.status, SessionStatus::Closed);

        let next = service.start_session("demo.myshopify.com", "u1").await.unwrap();
        assert_ne!(first.id, next.id);
        assert_eq!(service.list_by_shop("demo.myshopify.com").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_close_unknown_session_is_not_found() {
        let err = service().close_session("missing").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
