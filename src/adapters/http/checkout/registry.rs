//! In-memory registry of live checkout sessions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::Mutex as AsyncMutex;

use crate::application::CheckoutOrchestrator;
use crate::domain::foundation::{CheckoutSessionId, Timestamp};

pub type SharedOrchestrator = Arc<AsyncMutex<CheckoutOrchestrator>>;

struct Entry {
    orchestrator: SharedOrchestrator,
    created_at: Timestamp,
}

/// Sessions keyed by id. Each orchestrator sits behind its own async lock,
/// so one slow gateway call never blocks another session.
///
/// Sessions live for a fixed TTL from creation. Expired entries are swept
/// whenever a new session is inserted.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<CheckoutSessionId, Entry>>,
    ttl: Duration,
}

impl SessionRegistry {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn insert(&self, orchestrator: CheckoutOrchestrator) -> SharedOrchestrator {
        let evicted = self.sweep_expired(Timestamp::now());
        if evicted > 0 {
            tracing::debug!(evicted, live = self.len(), "Expired checkout sessions dropped");
        }

        let id = orchestrator.id();
        let created_at = orchestrator.session().created_at();
        let shared = Arc::new(AsyncMutex::new(orchestrator));
        self.sessions().insert(
            id,
            Entry {
                orchestrator: shared.clone(),
                created_at,
            },
        );
        shared
    }

    pub fn get(&self, id: &CheckoutSessionId) -> Option<SharedOrchestrator> {
        self.sessions().get(id).map(|e| e.orchestrator.clone())
    }

    /// Drops sessions older than the TTL as of `now`. Returns how many went.
    ///
    /// Sessions with a request in flight are kept until it finishes.
    pub fn sweep_expired(&self, now: Timestamp) -> usize {
        let mut sessions = self.sessions();
        let before = sessions.len();
        sessions.retain(|_, entry| {
            let age = now
                .as_datetime()
                .signed_duration_since(*entry.created_at.as_datetime())
                .to_std()
                .unwrap_or_default();
            age < self.ttl || entry.orchestrator.try_lock().is_err()
        });
        before - sessions.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.sessions().len()
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<CheckoutSessionId, Entry>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
