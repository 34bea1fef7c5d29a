//! Session Store - one typed [`Session`] per conversation.
//!
//! Each entry sits behind its own async mutex. A turn holds that mutex from
//! dispatch to reply, which serialises turns of one conversation while
//! different conversations proceed independently.
//!
//! Conversations left idle longer than the configured timeout are evicted on
//! every `reset` and by [`SessionStore::evict_idle`]. A session whose turn is
//! in flight is never evicted.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

use crate::domain::dialogue::Session;
use crate::domain::foundation::SessionId;

/// Shared handle to one conversation's session.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Idle limit used when none is configured.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, SessionHandle>>>,
    idle_timeout: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self {
            sessions: Arc::default(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Replaces any existing session for `id` with a fresh one, evicting
    /// idle conversations first.
    pub async fn reset(&self, id: SessionId) -> SessionHandle {
        let handle = Arc::new(Mutex::new(Session::new(id)));
        let mut sessions = self.sessions.write().await;
        let evicted = evict_idle_in(&mut sessions, self.idle_timeout);
        if evicted > 0 {
            tracing::info!(evicted, "Evicted idle conversations");
        }
        sessions.insert(id, handle.clone());
        handle
    }

    pub async fn get(&self, id: SessionId) -> Option<SessionHandle> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Removes the session only if it is still `handle`; a session started
    /// again in the meantime is left alone.
    pub async fn remove_if_current(&self, id: SessionId, handle: &SessionHandle) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get(&id) {
            Some(current) if Arc::ptr_eq(current, handle) => {
                sessions.remove(&id);
                true
            }
            _ => false,
        }
    }

    /// Drops every conversation idle past the timeout. Returns how many went.
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        evict_idle_in(&mut sessions, self.idle_timeout)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

fn evict_idle_in(sessions: &mut HashMap<SessionId, SessionHandle>, idle_timeout: Duration) -> usize {
    let before = sessions.len();
    // A locked session has a turn in flight
    sessions.retain(|_, handle| {
        let expired = match handle.try_lock() {
            Ok(session) => session.idle_for() >= idle_timeout,
            Err(_) => false,
        };
        !expired
    });
    before - sessions.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dialogue::DialogueState;

    #[tokio::test]
    async fn reset_creates_fresh_session() {
        let store = SessionStore::new();
        let id = SessionId::new();

        let first = store.reset(id).await;
        first.lock().await.set_raw_prompt("old");
        let second = store.reset(id).await;

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.lock().await.raw_prompt(), None);
        assert_eq!(second.lock().await.state(), DialogueState::AwaitingPrompt);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn sessions_are_isolated_by_id() {
        let store = SessionStore::new();
        let a = SessionId::new();
        let b = SessionId::new();

        store.reset(a).await.lock().await.set_raw_prompt("for a");
        store.reset(b).await;

        let b_session = store.get(b).await.unwrap();
        assert_eq!(b_session.lock().await.raw_prompt(), None);
    }

    #[tokio::test]
    async fn remove_ignores_replaced_sessions() {
        let store = SessionStore::new();
        let id = SessionId::new();

        let stale = store.reset(id).await;
        let current = store.reset(id).await;

        assert!(!store.remove_if_current(id, &stale).await);
        assert!(store.get(id).await.is_some());
        assert!(store.remove_if_current(id, &current).await);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn get_unknown_is_none() {
        assert!(SessionStore::new().get(SessionId::new()).await.is_none());
    }

    mod idle_eviction {
        use super::*;

        const IDLE: Duration = Duration::from_millis(30);

        #[tokio::test]
        async fn reset_evicts_abandoned_sessions() {
            let store = SessionStore::new().with_idle_timeout(IDLE);
            let abandoned = SessionId::new();
            store.reset(abandoned).await;

            tokio::time::sleep(IDLE * 2).await;
            let fresh = SessionId::new();
            store.reset(fresh).await;

            assert!(store.get(abandoned).await.is_none());
            assert!(store.get(fresh).await.is_some());
            assert_eq!(store.len().await, 1);
        }

        #[tokio::test]
        async fn touched_sessions_survive() {
            let store = SessionStore::new().with_idle_timeout(IDLE);
            let id = SessionId::new();
            let handle = store.reset(id).await;

            tokio::time::sleep(IDLE * 2).await;
            handle.lock().await.touch();

            assert_eq!(store.evict_idle().await, 0);
            assert!(store.get(id).await.is_some());
        }

        #[tokio::test]
        async fn sessions_with_a_turn_in_flight_are_kept() {
            let store = SessionStore::new().with_idle_timeout(IDLE);
            let id = SessionId::new();
            let handle = store.reset(id).await;

            let _turn = handle.lock().await;
            tokio::time::sleep(IDLE * 2).await;

            assert_eq!(store.evict_idle().await, 0);
            assert_eq!(store.len().await, 1);
        }

        #[tokio::test]
        async fn evict_idle_reports_count() {
            let store = SessionStore::new().with_idle_timeout(IDLE);
            store.reset(SessionId::new()).await;
            store.reset(SessionId::new()).await;

            tokio::time::sleep(IDLE * 2).await;

            assert_eq!(store.evict_idle().await, 2);
            assert!(store.is_empty().await);
        }
    }
}
