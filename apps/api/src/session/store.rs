//! In-memory session registry. Sessions are never persisted; idle ones are swept.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::info;
use uuid::Uuid;

use crate::session::Session;

/// One user's session. The mutex serialises actions so each runs to completion.
#[derive(Debug)]
pub struct SessionHandle {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    last_active: Mutex<Instant>,
    session: Mutex<Session>,
}

impl SessionHandle {
    /// Locks the session and marks it active.
    pub async fn lock(&self) -> MutexGuard<'_, Session> {
        *self.last_active.lock().await = Instant::now();
        self.session.lock().await
    }

    async fn idle_for(&self) -> Duration {
        self.last_active.lock().await.elapsed()
    }

    /// True while an action holds the session.
    fn in_use(&self) -> bool {
        self.session.try_lock().is_err()
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<SessionHandle>>>>,
    idle_ttl: Duration,
}

impl SessionStore {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl,
        }
    }

    pub async fn create(&self) -> Arc<SessionHandle> {
        let handle = Arc::new(SessionHandle {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            last_active: Mutex::new(Instant::now()),
            session: Mutex::new(Session::new()),
        });
        self.sessions
            .write()
            .await
            .insert(handle.id, Arc::clone(&handle));
        handle
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<SessionHandle>> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Returns true if a session was removed.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops every session idle for at least the TTL. Sessions with an action
    /// in flight are kept. Returns the number removed.
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;

        let mut expired = Vec::new();
        for (id, handle) in sessions.iter() {
            if !handle.in_use() && handle.idle_for().await >= self.idle_ttl {
                expired.push(*id);
            }
        }

        for id in &expired {
            sessions.remove(id);
        }
        expired.len()
    }

    /// Runs `evict_idle` every `every` for the life of the process.
    pub fn spawn_idle_sweep(&self, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let evicted = store.evict_idle().await;
                if evicted > 0 {
                    info!(
                        "Evicted {evicted} idle session(s), {} active",
                        store.len().await
                    );
                }
            }
        })
    }
}
