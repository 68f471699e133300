// src/store/mod.rs
pub mod file;
pub mod memory;

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::model::{History, Preferences};
use crate::notify::Permission;

pub use file::FileStore;
pub use memory::MemoryStore;

pub const HISTORY_KEY: &str = "notificationHistory";
pub const NOTIFICATIONS_ENABLED_KEY: &str = "notificationsEnabled";
pub const POLL_INTERVAL_KEY: &str = "pollIntervalMinutes";
pub const PERMISSION_KEY: &str = "notificationPermission";

/// Durable string key/value storage scoped to this client.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

/// History and preferences on top of a raw key/value store.
///
/// `load_history` followed by `save_history` is a plain read-modify-write.
/// Two writers sharing the backing store race with last-writer-wins.
#[derive(Clone)]
pub struct PersistentStore {
    kv: Arc<dyn KeyValueStore>,
}

impl PersistentStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Never fails: unreadable or undecodable history comes back empty.
    pub async fn load_history(&self) -> History {
        let raw = match self.kv.get(HISTORY_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return History::new(),
            Err(e) => {
                tracing::warn!("history read failed, using empty: {e:#}");
                return History::new();
            }
        };
        match serde_json::from_str::<History>(&raw) {
            Ok(h) => h,
            Err(e) => {
                tracing::warn!(error = %e, "stored history corrupt, using empty");
                History::new()
            }
        }
    }

    /// Total overwrite of the stored history.
    pub async fn save_history(&self, history: &History) -> Result<()> {
        let raw = serde_json::to_string(history).context("encode history")?;
        self.kv.set(HISTORY_KEY, &raw).await.context("write history")
    }

    /// Drops the stored sequence; the next load sees an empty history.
    pub async fn clear_history(&self) -> Result<()> {
        self.kv
            .remove(HISTORY_KEY)
            .await
            .context("clearing history")?;
        tracing::info!("history cleared");
        Ok(())
    }

    /// Typed preference read; missing or undecodable values yield `default`.
    pub async fn get_preference<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.kv.get(key).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::debug!(key, error = %e, "preference undecodable, using default");
                default
            }),
            Ok(None) => default,
            Err(e) => {
                tracing::warn!(key, "preference read failed: {e:#}");
                default
            }
        }
    }

    pub async fn set_preference<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value).context("encode preference")?;
        self.kv
            .set(key, &raw)
            .await
            .with_context(|| format!("write preference {key}"))
    }

    pub async fn load_preferences(&self) -> Preferences {
        let d = Preferences::default();
        Preferences {
            notifications_enabled: self
                .get_preference(NOTIFICATIONS_ENABLED_KEY, d.notifications_enabled)
                .await,
            poll_interval_minutes: self
                .get_preference(POLL_INTERVAL_KEY, d.poll_interval_minutes)
                .await,
        }
    }

    pub async fn notifications_enabled(&self) -> bool {
        self.get_preference(NOTIFICATIONS_ENABLED_KEY, false).await
    }

    pub async fn set_notifications_enabled(&self, on: bool) -> Result<()> {
        self.set_preference(NOTIFICATIONS_ENABLED_KEY, &on).await
    }

    pub async fn set_poll_interval_minutes(&self, minutes: u32) -> Result<()> {
        self.set_preference(POLL_INTERVAL_KEY, &minutes).await
    }

    /// Last permission answer from an explicit request; `Default` if never asked.
    pub async fn permission(&self) -> Permission {
        let raw: String = self.get_preference(PERMISSION_KEY, String::new()).await;
        raw.parse().unwrap_or_default()
    }

    pub async fn set_permission(&self, perm: Permission) -> Result<()> {
        self.set_preference(PERMISSION_KEY, perm.as_str()).await
    }
}
