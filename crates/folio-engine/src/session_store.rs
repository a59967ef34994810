//! Keyed session storage with expiry
//!
//! The map itself is behind a short-lived std mutex used only for lookup and
//! insertion. Each session sits behind its own async mutex, which an `ask`
//! holds for its whole duration so asks within one session are serialized.

use crate::config::SessionConfig;
use crate::session::{ConversationSession, SessionLimits};
use folio_domain::{Clock, SessionId};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info};

/// Shared handle to one session
pub type SessionHandle = Arc<tokio::sync::Mutex<ConversationSession>>;

/// Result of looking up a session for an ask
#[derive(Debug, Clone)]
pub struct Checkout {
    /// The id actually in use
    pub id: SessionId,
    /// The session
    pub handle: SessionHandle,
    /// A new session was created
    pub created: bool,
    /// The requested id had expired and was replaced by `id`
    pub replaced: Option<SessionId>,
}

#[derive(Default)]
struct Inner {
    sessions: HashMap<SessionId, SessionHandle>,
    retired: HashSet<SessionId>,
    retired_order: VecDeque<SessionId>,
}

impl Inner {
    fn retire(&mut self, id: SessionId, capacity: usize) {
        if capacity == 0 || !self.retired.insert(id.clone()) {
            return;
        }
        self.retired_order.push_back(id);
        while self.retired_order.len() > capacity {
            if let Some(oldest) = self.retired_order.pop_front() {
                self.retired.remove(&oldest);
            }
        }
    }
}

/// All live sessions
pub struct SessionStore {
    inner: Mutex<Inner>,
    clock: Arc<dyn Clock>,
    limits: SessionLimits,
    idle_timeout: Duration,
    retired_capacity: usize,
}

impl SessionStore {
    /// Create an empty store
    pub fn new(config: &SessionConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            clock,
            limits: SessionLimits {
                max_turns: config.max_turns,
                max_chars: config.max_chars,
            },
            idle_timeout: config.idle_timeout(),
            retired_capacity: config.retired_capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Idle timeout in use
    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Find the session for `requested`, creating one if needed
    ///
    /// An expired session is discarded and replaced by a fresh session under
    /// a newly generated id; the expired id is never handed out again. A
    /// session whose lock is held has an ask in flight and is never expired.
    pub fn checkout(&self, requested: &SessionId) -> Checkout {
        let now = self.clock.now_ms();
        let mut inner = self.lock();

        if let Some(handle) = inner.sessions.get(requested) {
            let expired = handle
                .try_lock()
                .map(|s| s.is_expired(now, self.idle_timeout))
                .unwrap_or(false);

            if !expired {
                return Checkout {
                    id: requested.clone(),
                    handle: Arc::clone(handle),
                    created: false,
                    replaced: None,
                };
            }

            inner.sessions.remove(requested);
            inner.retire(requested.clone(), self.retired_capacity);
            info!("Session {} expired", requested);
        }

        let (id, replaced) = if inner.retired.contains(requested) {
            (SessionId::generate(), Some(requested.clone()))
        } else {
            (requested.clone(), None)
        };

        let handle = Arc::new(tokio::sync::Mutex::new(ConversationSession::new(
            id.clone(),
            now,
            self.limits,
        )));
        inner.sessions.insert(id.clone(), Arc::clone(&handle));
        debug!("Created session {}", id);

        Checkout {
            id,
            handle,
            created: true,
            replaced,
        }
    }

    /// Live session by id, without creating or expiring anything
    pub fn get(&self, id: &SessionId) -> Option<SessionHandle> {
        self.lock().sessions.get(id).cloned()
    }

    /// Remove every expired, idle session; returns how many were removed
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let mut inner = self.lock();

        let expired: Vec<SessionId> = inner
            .sessions
            .iter()
            .filter(|(_, handle)| {
                handle
                    .try_lock()
                    .map(|s| s.is_expired(now, self.idle_timeout))
                    .unwrap_or(false)
            })
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            inner.sessions.remove(id);
            inner.retire(id.clone(), self.retired_capacity);
        }

        if !expired.is_empty() {
            debug!("Swept {} expired session(s)", expired.len());
        }
        expired.len()
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.lock().sessions.len()
    }

    /// Whether there are no live sessions
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_domain::{ManualClock, Turn};

    fn store(clock: Arc<ManualClock>) -> SessionStore {
        let mut config = SessionConfig::default();
        config.idle_timeout_secs = 60;
        SessionStore::new(&config, clock)
    }

    #[tokio::test]
    async fn test_checkout_creates_then_reuses() {
        let clock = Arc::new(ManualClock::new(0));
        let store = store(clock.clone());
        let id = SessionId::from("abc");

        let first = store.checkout(&id);
        assert!(first.created);
        assert_eq!(first.id, id);

        first.handle.lock().await.append(Turn::user("hi", 1));
        clock.advance_ms(30_000);

        let second = store.checkout(&id);
        assert!(!second.created);
        assert_eq!(second.handle.lock().await.len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_expired_session_gets_new_id() {
        let clock = Arc::new(ManualClock::new(0));
        let store = store(clock.clone());
        let id = SessionId::from("abc");

        store.checkout(&id).handle.lock().await.append(Turn::user("hi", 0));
        clock.advance_ms(60_000);

        let next = store.checkout(&id);
        assert!(next.created);
        assert_ne!(next.id, id);
        assert_eq!(next.replaced, Some(id.clone()));
        assert!(next.handle.lock().await.is_empty());
        assert!(store.get(&id).is_none());
    }

    #[tokio::test]
    async fn test_swept_id_is_not_reused() {
        let clock = Arc::new(ManualClock::new(0));
        let store = store(clock.clone());
        let id = SessionId::from("abc");

        store.checkout(&id);
        clock.advance_ms(61_000);
        assert_eq!(store.sweep_expired(), 1);
        assert!(store.is_empty());

        let next = store.checkout(&id);
        assert_ne!(next.id, id);
    }

    #[tokio::test]
    async fn test_busy_session_is_not_expired() {
        let clock = Arc::new(ManualClock::new(0));
        let store = store(clock.clone());
        let id = SessionId::from("abc");

        let checkout = store.checkout(&id);
        let _guard = checkout.handle.lock().await;
        clock.advance_ms(120_000);

        assert_eq!(store.sweep_expired(), 0);
        assert!(!store.checkout(&id).created);
    }

    #[test]
    fn test_retired_ids_are_bounded() {
        let mut inner = Inner::default();
        for i in 0..5 {
            inner.retire(SessionId::from(format!("s{}", i)), 3);
        }
        assert_eq!(inner.retired.len(), 3);
        assert!(!inner.retired.contains(&SessionId::from("s0")));
        assert!(inner.retired.contains(&SessionId::from("s4")));
    }
}
