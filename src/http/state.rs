use crate::session::{ReadAlongHandle, SessionConfig};
use crate::source::TranscriptSource;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{info, warn};

/// An open view and when a request last touched it
#[derive(Clone)]
pub struct ViewEntry {
    pub handle: ReadAlongHandle,
    pub last_seen: Instant,
}

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Open read-along views (view_id → entry)
    pub sessions: Arc<RwLock<HashMap<String, ViewEntry>>>,

    /// Source every new session fetches and streams from
    pub source: Arc<dyn TranscriptSource>,

    /// Tuning applied to new sessions
    pub session_config: SessionConfig,
}

impl AppState {
    pub fn new(source: Arc<dyn TranscriptSource>, session_config: SessionConfig) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            source,
            session_config,
        }
    }

    pub async fn insert(&self, view_id: String, handle: ReadAlongHandle) {
        let entry = ViewEntry {
            handle,
            last_seen: Instant::now(),
        };
        self.sessions.write().await.insert(view_id, entry);
    }

    /// Look up a session handle by view id, marking the view as in use
    pub async fn session(&self, view_id: &str) -> Option<ReadAlongHandle> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(view_id)?;
        entry.last_seen = Instant::now();
        Some(entry.handle.clone())
    }

    pub async fn remove(&self, view_id: &str) -> Option<ReadAlongHandle> {
        self.sessions
            .write()
            .await
            .remove(view_id)
            .map(|entry| entry.handle)
    }

    /// Shut down views nobody has touched within the idle timeout
    ///
    /// Browsers that close a tab never send `DELETE`. Returns how many views
    /// were reaped.
    pub async fn reap_idle(&self) -> usize {
        let idle = self.session_config.idle_timeout();
        let now = Instant::now();

        let expired: Vec<(String, ReadAlongHandle)> = {
            let mut sessions = self.sessions.write().await;
            let ids: Vec<String> = sessions
                .iter()
                .filter(|(_, entry)| now.saturating_duration_since(entry.last_seen) >= idle)
                .map(|(id, _)| id.clone())
                .collect();
            ids.into_iter()
                .filter_map(|id| sessions.remove(&id).map(|entry| (id, entry.handle)))
                .collect()
        };

        for (view_id, handle) in &expired {
            info!("Reaping idle read-along view {}", view_id);
            if let Err(e) = handle.shutdown().await {
                warn!("Idle view {} was already stopped: {:#}", view_id, e);
            }
        }

        expired.len()
    }

    /// Run `reap_idle` periodically for as long as the server lives
    pub fn spawn_reaper(&self) -> JoinHandle<()> {
        let state = self.clone();
        let period = (self.session_config.idle_timeout() / 4).max(Duration::from_secs(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                state.reap_idle().await;
            }
        })
    }
}
