use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info};
use uuid::Uuid;

use super::controller::{AttemptState, Session};
use crate::errors::AppError;
use crate::persistence::KeyValueStore;

pub type SharedSession = Arc<Mutex<Session>>;

struct Entry {
    session: SharedSession,
    last_seen: Instant,
}

/// Live sessions by id. Sessions are held in memory only; drafts and theme
/// are the only state that outlives the process. Sessions nobody has touched
/// for a while are dropped by the sweeper.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, Entry>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, store: Arc<dyn KeyValueStore>) -> SharedSession {
        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(Session::new(id, store)));
        self.sessions.write().await.insert(
            id,
            Entry {
                session: session.clone(),
                last_seen: Instant::now(),
            },
        );
        info!("Created session {id}");
        session
    }

    /// Looks a session up and marks it as recently used.
    pub async fn get(&self, id: Uuid) -> Result<SharedSession, AppError> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;
        entry.last_seen = Instant::now();
        Ok(entry.session.clone())
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!("Discarded session {id}");
        }
        removed
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops sessions untouched for longer than `max_idle`. Sessions that are
    /// locked, generating or parsing an upload are kept.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, entry| {
            if now.duration_since(entry.last_seen) <= max_idle {
                return true;
            }
            let Ok(session) = entry.session.try_lock() else {
                return true;
            };
            if *session.attempt() == AttemptState::Pending || session.is_uploading() {
                return true;
            }
            debug!("Evicting idle session {id}");
            false
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!("Evicted {evicted} idle sessions, {} remain", sessions.len());
        }
        evicted
    }

    /// Runs `evict_idle` every `every` until the runtime shuts down.
    pub fn spawn_sweeper(&self, max_idle: Duration, every: Duration) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut ticks = interval(every);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                registry.evict_idle(max_idle).await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::{advance, sleep};

    use super::*;
    use crate::generation::tone::Tone;
    use crate::persistence::memory_store::MemoryStore;

    const IDLE: Duration = Duration::from_secs(60 * 60);

    fn store() -> Arc<dyn KeyValueStore> {
        Arc::new(MemoryStore::new())
    }

    #[tokio::test]
    async fn test_create_get_remove() {
        let registry = SessionRegistry::new();
        let session = registry.create(store()).await;
        let id = session.lock().await.id();

        assert!(registry.get(id).await.is_ok());

        assert!(registry.remove(id).await);
        assert!(!registry.remove(id).await);
        assert!(matches!(registry.get(id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let registry = SessionRegistry::new();
        let store = store();
        let a = registry.create(store.clone()).await;
        let b = registry.create(store).await;

        a.lock().await.set_tone(Tone::Creative);
        assert_ne!(a.lock().await.view().tone, b.lock().await.view().tone);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sessions_are_evicted() {
        let registry = SessionRegistry::new();
        let stale = registry.create(store()).await.lock().await.id();
        advance(Duration::from_secs(40 * 60)).await;
        let fresh = registry.create(store()).await.lock().await.id();
        advance(Duration::from_secs(30 * 60)).await;

        assert_eq!(registry.evict_idle(IDLE).await, 1);
        assert!(matches!(registry.get(stale).await, Err(AppError::NotFound(_))));
        assert!(registry.get(fresh).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_keeps_a_session_alive() {
        let registry = SessionRegistry::new();
        let id = registry.create(store()).await.lock().await.id();

        for _ in 0..3 {
            advance(Duration::from_secs(45 * 60)).await;
            registry.get(id).await.unwrap();
        }
        assert_eq!(registry.evict_idle(IDLE).await, 0);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_sessions_survive_eviction() {
        let registry = SessionRegistry::new();
        let session = registry.create(store()).await;
        session.lock().await.begin_upload("resume.pdf").unwrap();
        advance(IDLE * 2).await;

        assert_eq!(registry.evict_idle(IDLE).await, 0);

        let held = registry.create(store()).await;
        let _guard = held.lock().await;
        advance(IDLE * 2).await;
        assert_eq!(registry.evict_idle(IDLE).await, 0);
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_evicts_on_its_own() {
        let registry = SessionRegistry::new();
        registry.create(store()).await;
        let sweeper = registry.spawn_sweeper(IDLE, Duration::from_secs(60));

        sleep(IDLE + Duration::from_secs(120)).await;
        assert_eq!(registry.len().await, 0);
        sweeper.abort();
    }
}
