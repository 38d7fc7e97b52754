//! In-memory session registry
//!
//! Sessions end when the client deletes them or after sitting idle past the
//! store's timeout. A session mid-reply is never evicted.

use super::session::{ChatSession, ChatState};
use crate::error::{AssistError, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

/// Default idle time before a session is dropped
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Live chat sessions keyed by id
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, ChatSession>>>,
    idle_timeout: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            idle_timeout,
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Start a session and return its id
    pub async fn create(&self) -> String {
        let id = Uuid::new_v4().to_string();
        self.sessions
            .lock()
            .await
            .insert(id.clone(), ChatSession::new(id.clone()));
        info!(session = %id, "Session started");
        id
    }

    /// Run `f` against the session while holding the lock
    pub async fn with<R>(&self, id: &str, f: impl FnOnce(&mut ChatSession) -> R) -> Result<R> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| AssistError::SessionNotFound(id.to_string()))?;
        Ok(f(session))
    }

    /// Copy of the session's current state
    pub async fn snapshot(&self, id: &str) -> Result<ChatSession> {
        self.with(id, |session| session.clone()).await
    }

    /// Drop the session and its transcript
    pub async fn end(&self, id: &str) -> Result<()> {
        self.sessions
            .lock()
            .await
            .remove(id)
            .map(|_| info!(session = %id, "Session ended"))
            .ok_or_else(|| AssistError::SessionNotFound(id.to_string()))
    }

    pub async fn count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Drop sessions idle since before `cutoff`; returns how many went
    pub async fn evict_idle_since(&self, cutoff: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|id, session| {
            let keep = session.state() == ChatState::StreamingResponse
                || session.last_active() >= cutoff;
            if !keep {
                debug!(session = %id, created_at = %session.created_at(), "Session expired");
            }
            keep
        });
        before - sessions.len()
    }

    /// Drop sessions idle longer than the store's timeout
    pub async fn evict_idle(&self) -> usize {
        let cutoff = chrono::Duration::from_std(self.idle_timeout)
            .ok()
            .and_then(|idle| Utc::now().checked_sub_signed(idle))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        self.evict_idle_since(cutoff).await
    }

    /// Sweep idle sessions in the background at a fraction of the timeout
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        let store = self.clone();
        let period = (self.idle_timeout / 4).max(Duration::from_millis(100));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let evicted = store.evict_idle().await;
                if evicted > 0 {
                    let remaining = store.count().await;
                    info!(evicted, remaining, "Idle sessions removed");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_lifecycle() {
        let store = SessionStore::new();
        let id = store.create().await;
        assert_eq!(store.count().await, 1);

        store
            .with(&id, |s| s.begin_turn("Price of NVDA").map(|_| ()))
            .await
            .unwrap()
            .unwrap();
        let snapshot = store.snapshot(&id).await.unwrap();
        assert_eq!(snapshot.history().len(), 1);
        assert_eq!(snapshot.last_symbol(), Some("NVDA"));

        store.end(&id).await.unwrap();
        assert_eq!(store.count().await, 0);
        assert!(matches!(
            store.snapshot(&id).await,
            Err(AssistError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_idle_sessions_expire() {
        let store = SessionStore::new();
        let stale = store.create().await;
        let busy = store.create().await;
        store
            .with(&busy, |s| s.begin_turn("Price of NVDA").map(|_| ()))
            .await
            .unwrap()
            .unwrap();

        let cutoff = Utc::now() + chrono::Duration::seconds(1);
        assert_eq!(store.evict_idle_since(cutoff).await, 1);
        assert!(matches!(
            store.snapshot(&stale).await,
            Err(AssistError::SessionNotFound(_))
        ));
        // Still streaming a reply
        assert!(store.snapshot(&busy).await.is_ok());
    }

    #[tokio::test]
    async fn test_recent_sessions_survive() {
        let store = SessionStore::with_idle_timeout(Duration::from_secs(60));
        store.create().await;
        assert_eq!(store.evict_idle().await, 0);
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn test_sweeper_evicts_expired_sessions() {
        let store = SessionStore::with_idle_timeout(Duration::ZERO);
        store.create().await;
        let sweeper = store.spawn_sweeper();

        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(store.count().await, 0);
        sweeper.abort();
    }

    #[tokio::test]
    async fn test_end_unknown_session() {
        let store = SessionStore::new();
        assert!(store.end("missing").await.is_err());
    }
}
