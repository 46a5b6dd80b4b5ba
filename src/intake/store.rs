//! Session store: in-memory per-user intake sessions with idle expiry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::state::Session;

/// Process-wide map of user id → in-progress session.
///
/// One lock guards the whole map. Each call is atomic on its own; a
/// read-modify-write spanning `get` and `put` is not, so two concurrent
/// messages from the same user race and the last `put` wins.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    idle_timeout: Duration,
}

impl SessionStore {
    /// Create a store that treats sessions idle longer than `idle_timeout`
    /// as gone.
    pub fn new(idle_timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        })
    }

    /// Snapshot of a user's live session, if any.
    pub async fn get(&self, user_id: &str) -> Option<Session> {
        let sessions = self.sessions.read().await;
        sessions
            .get(user_id)
            .filter(|s| !s.is_idle_for(self.idle_timeout, Utc::now()))
            .cloned()
    }

    /// Insert or overwrite a user's session.
    pub async fn put(&self, user_id: &str, session: Session) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(user_id.to_string(), session);
    }

    /// Remove and return a user's session. An expired session is removed
    /// but reported as absent.
    pub async fn remove(&self, user_id: &str) -> Option<Session> {
        let mut sessions = self.sessions.write().await;
        sessions
            .remove(user_id)
            .filter(|s| !s.is_idle_for(self.idle_timeout, Utc::now()))
    }

    /// Drop every idle session. Returns the number evicted.
    pub async fn expire_idle(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|user_id, session| {
            let idle = session.is_idle_for(self.idle_timeout, now);
            if idle {
                debug!(user_id = %user_id, step = %session.step, "Session expired");
            }
            !idle
        });
        let expired = before - sessions.len();

        if expired > 0 {
            info!(count = expired, "Expired idle sessions");
        }

        expired
    }

    /// Number of stored sessions, including any not yet swept.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// Spawn a background task that periodically evicts idle sessions.
pub fn spawn_expiry_task(
    store: Arc<SessionStore>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            store.expire_idle().await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::state::IntakeStep;

    const HOUR: Duration = Duration::from_secs(3600);

    fn stale_session() -> Session {
        let mut session = Session::new();
        session.updated_at = Utc::now() - chrono::Duration::hours(2);
        session
    }

    #[tokio::test]
    async fn put_get_remove() {
        let store = SessionStore::new(HOUR);
        assert!(store.is_empty().await);
        assert!(store.get("u1").await.is_none());

        store.put("u1", Session::new()).await;
        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("u1").await.unwrap().step, IntakeStep::Age);

        assert!(store.remove("u1").await.is_some());
        assert!(store.remove("u1").await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn put_overwrites() {
        let store = SessionStore::new(HOUR);
        let mut session = Session::new();
        session.age = Some(40);
        session.step = IntakeStep::Smoker;
        store.put("u1", session).await;

        store.put("u1", Session::new()).await;
        let current = store.get("u1").await.unwrap();
        assert_eq!(current.step, IntakeStep::Age);
        assert!(current.age.is_none());
    }

    #[tokio::test]
    async fn users_are_independent() {
        let store = SessionStore::new(HOUR);
        store.put("u1", Session::new()).await;
        store.put("u2", Session::new()).await;
        store.remove("u1").await;
        assert!(store.get("u2").await.is_some());
    }

    #[tokio::test]
    async fn idle_session_reads_as_absent() {
        let store = SessionStore::new(HOUR);
        store.put("u1", stale_session()).await;
        assert!(store.get("u1").await.is_none());
        assert!(store.remove("u1").await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn expire_idle_evicts_only_stale() {
        let store = SessionStore::new(HOUR);
        store.put("stale", stale_session()).await;
        store.put("fresh", Session::new()).await;

        assert_eq!(store.expire_idle().await, 1);
        assert_eq!(store.len().await, 1);
        assert!(store.get("fresh").await.is_some());
        assert_eq!(store.expire_idle().await, 0);
    }

    #[tokio::test]
    async fn expiry_task_sweeps() {
        let store = SessionStore::new(HOUR);
        store.put("stale", stale_session()).await;

        let handle = spawn_expiry_task(Arc::clone(&store), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();

        assert!(store.is_empty().await);
    }
}
