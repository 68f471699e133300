// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod engine;
pub mod model;
pub mod notify;
pub mod poller;
pub mod remote;
pub mod store;
pub mod sync;
pub mod timeline;
pub mod view;

// ---- Re-exports for stable public API ----
pub use crate::config::ClientConfig;
pub use crate::engine::{Decision, DedupEngine, EngineOutcome, SkipReason};
pub use crate::model::{AgentStatus, History, HistoryItem, Preferences, RemoteState};
pub use crate::notify::{Dispatcher, Notifier, Permission};
pub use crate::poller::Poller;
pub use crate::remote::{FetchError, HttpStateClient, StateSource};
pub use crate::store::{FileStore, KeyValueStore, MemoryStore, PersistentStore};
pub use crate::sync::{Synchronizer, TickOutcome};
pub use crate::view::{RenderEvent, View};

use std::sync::Arc;

/// Collaborators wired from configuration, as the binary uses them.
pub struct Client {
    pub http: HttpStateClient,
    pub store: PersistentStore,
    pub dispatcher: Dispatcher,
}

impl Client {
    /// Configured permission wins; `default` defers to a previously stored grant.
    pub async fn open(cfg: &ClientConfig) -> Self {
        let http = HttpStateClient::new(cfg.backend_url.clone());
        let store = PersistentStore::new(Arc::new(FileStore::new(cfg.state_dir.clone())));
        let permission = match cfg.notify_permission {
            Permission::Default => store.permission().await,
            configured => configured,
        };
        let dispatcher = Dispatcher::new(cfg.build_notifier(permission));
        tracing::info!(
            backend = %cfg.backend_url,
            state_dir = %cfg.state_dir.display(),
            permission = %dispatcher.permission(),
            "client configured"
        );
        Self {
            http,
            store,
            dispatcher,
        }
    }

    /// Poller over these collaborators with a fresh dedup engine.
    pub fn poller(&self, cfg: &ClientConfig) -> Poller {
        let sync = Synchronizer::new(
            Arc::new(self.http.clone()),
            self.store.clone(),
            self.dispatcher.clone(),
        );
        Poller::with_period(sync, cfg.poll_period())
    }
}
