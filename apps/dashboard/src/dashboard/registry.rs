use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::info;
use uuid::Uuid;

use crate::dashboard::session::Session;

struct Entry {
    session: Arc<Mutex<Session>>,
    last_seen: Instant,
}

/// In-process sessions keyed by id. Each session has its own lock so one
/// visitor's actions are serialized without blocking anyone else.
///
/// Sessions are never removed on request; a session untouched for longer
/// than the idle TTL is dropped by `evict_idle`.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, Entry>>>,
}

impl SessionRegistry {
    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.write().await.insert(
            id,
            Entry {
                session: Arc::new(Mutex::new(Session::new())),
                last_seen: Instant::now(),
            },
        );
        id
    }

    /// Looks up a session and marks it as used.
    pub async fn get(&self, id: Uuid) -> Option<Arc<Mutex<Session>>> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_seen = Instant::now();
        Some(entry.session.clone())
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops every session idle for longer than `ttl` and returns how many
    /// were removed. A handler already holding a session keeps its `Arc`.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) <= ttl);
        before - sessions.len()
    }

    /// Runs `evict_idle` every `period` until the returned task is aborted.
    pub fn spawn_sweeper(&self, ttl: Duration, period: Duration) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let evicted = registry.evict_idle(ttl).await;
                if evicted > 0 {
                    info!(
                        "Evicted {evicted} idle sessions ({} active)",
                        registry.len().await
                    );
                }
            }
        })
    }
}
