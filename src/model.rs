// src/model.rs
//! Wire and storage shapes shared by the client, the store and the engine.

use serde::{Deserialize, Serialize};

/// Placeholder the backend reports before its first research cycle finishes.
pub const STANDBY_NOTIFICATION: &str = "Standby...";

/// Snapshot returned by `GET {backend}/latest`. Produced fresh on every poll.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteState {
    pub status: String,
    #[serde(default)]
    pub notification: String,
    #[serde(default)]
    pub analogy: String,
    #[serde(default)]
    pub news: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub date: String,
    /// Absent until the backend completes a cycle.
    #[serde(default)]
    pub time: Option<String>,
}

/// One accepted notification. Never mutated after it is committed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    pub notification: String,
    #[serde(default)]
    pub analogy: String,
    #[serde(default)]
    pub news: String,
    #[serde(default)]
    pub link: String,
}

/// Accepted notifications, oldest first. `notification` is unique across items.
pub type History = Vec<HistoryItem>;

/// User preferences, persisted independently of the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    pub notifications_enabled: bool,
    pub poll_interval_minutes: u32,
}

pub const DEFAULT_POLL_INTERVAL_MINUTES: u32 = 5;

impl Default for Preferences {
    fn default() -> Self {
        Self {
            notifications_enabled: false,
            poll_interval_minutes: DEFAULT_POLL_INTERVAL_MINUTES,
        }
    }
}

/// Coarse classification of the agent's status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentStatus {
    /// Agent is mid-cycle; no dedup check is made.
    Busy,
    /// Cycle finished or agent idle; the only state that may commit.
    Settled,
    /// The fetch itself failed.
    Connecting,
}

impl AgentStatus {
    /// Classify a status string reported by the backend.
    ///
    /// Settled: exactly `Sleeping` or `Success`, or containing `Cycle Complete`
    /// or `Limited`. Anything else counts as busy.
    pub fn classify(status: &str) -> Self {
        let settled = status == "Sleeping"
            || status == "Success"
            || status.contains("Cycle Complete")
            || status.contains("Limited");
        if settled {
            AgentStatus::Settled
        } else {
            AgentStatus::Busy
        }
    }

    pub fn is_settled(self) -> bool {
        matches!(self, AgentStatus::Settled)
    }
}

impl RemoteState {
    pub fn agent_status(&self) -> AgentStatus {
        AgentStatus::classify(&self.status)
    }
}
