//! # Deduplication Engine
//! Decides whether a freshly fetched `RemoteState` is genuinely new and, if so,
//! commits it to the stored history exactly once.
//!
//! The backend issues no ids, so identity is the `notification` text. Two distinct
//! findings with identical text collapse into one entry.
//!
//! `decide` is pure; `process` wraps it with the storage read-modify-write.

use chrono::{DateTime, Local, TimeZone};
use metrics::{counter, gauge};

use crate::model::{History, HistoryItem, RemoteState, STANDBY_NOTIFICATION};
use crate::store::PersistentStore;

/// Why a state did not produce a new history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotSettled,
    Empty,
    Standby,
    /// Same text as the last accepted item (fast path, no history scan).
    LastSeen,
    /// Text already present in stored history.
    InHistory,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::NotSettled => "not_settled",
            SkipReason::Empty => "empty",
            SkipReason::Standby => "standby",
            SkipReason::LastSeen => "last_seen",
            SkipReason::InHistory => "in_history",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Skip(SkipReason),
    Commit,
}

/// Result of one `process` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineOutcome {
    Skipped(SkipReason),
    Committed {
        item: HistoryItem,
        /// Full history after the append, as written to the store.
        history: History,
        /// True when the user has notifications enabled.
        notify: bool,
    },
}

impl EngineOutcome {
    pub fn is_commit(&self) -> bool {
        matches!(self, EngineOutcome::Committed { .. })
    }
}

/// Holds the in-memory last-seen marker. One engine per client context; a fresh
/// engine starts with an empty marker and relies on stored history alone.
#[derive(Debug, Clone, Default)]
pub struct DedupEngine {
    last_seen: String,
}

impl DedupEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_seen(&self) -> &str {
        &self.last_seen
    }

    /// Checks that need no storage access.
    fn fast_check(&self, state: &RemoteState) -> Option<SkipReason> {
        if !state.agent_status().is_settled() {
            return Some(SkipReason::NotSettled);
        }
        let text = state.notification.as_str();
        if text.is_empty() {
            Some(SkipReason::Empty)
        } else if text == STANDBY_NOTIFICATION {
            Some(SkipReason::Standby)
        } else if text == self.last_seen {
            Some(SkipReason::LastSeen)
        } else {
            None
        }
    }

    pub fn decide(&self, state: &RemoteState, history: &[HistoryItem]) -> Decision {
        if let Some(reason) = self.fast_check(state) {
            return Decision::Skip(reason);
        }
        if history
            .iter()
            .any(|h| h.notification == state.notification)
        {
            return Decision::Skip(SkipReason::InHistory);
        }
        Decision::Commit
    }

    /// Full decision plus commit: loads history only when the fast path passes,
    /// appends and saves on commit, and moves the marker.
    ///
    /// A failed save is logged; the marker still moves so the same content is not
    /// re-committed every tick while storage is unhappy.
    pub async fn process<Tz: TimeZone>(
        &mut self,
        state: &RemoteState,
        store: &PersistentStore,
        now: DateTime<Tz>,
    ) -> EngineOutcome
    where
        Tz::Offset: std::fmt::Display,
    {
        if let Some(reason) = self.fast_check(state) {
            return self.skipped(reason);
        }

        let mut history = store.load_history().await;
        if let Decision::Skip(reason) = self.decide(state, &history) {
            return self.skipped(reason);
        }

        let item = build_item(state, &now);
        self.last_seen = item.notification.clone();
        history.push(item.clone());

        if let Err(e) = store.save_history(&history).await {
            tracing::warn!("history save failed: {e:#}");
        }
        let notify = store.notifications_enabled().await;

        counter!("history_commits_total").increment(1);
        gauge!("history_len").set(history.len() as f64);
        tracing::info!(
            notification = %item.notification,
            history_len = history.len(),
            notify,
            "new research committed"
        );

        EngineOutcome::Committed {
            item,
            history,
            notify,
        }
    }

    fn skipped(&self, reason: SkipReason) -> EngineOutcome {
        counter!("dedup_skipped_total", "reason" => reason.as_str()).increment(1);
        tracing::debug!(reason = reason.as_str(), "no new research");
        EngineOutcome::Skipped(reason)
    }

    /// Convenience for callers without their own clock.
    pub async fn process_now(&mut self, state: &RemoteState, store: &PersistentStore) -> EngineOutcome {
        self.process(state, store, Local::now()).await
    }
}

/// Local clock label used when the backend did not send a time, e.g. `06:30 PM`.
pub fn time_label<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%I:%M %p").to_string()
}

fn build_item<Tz: TimeZone>(state: &RemoteState, now: &DateTime<Tz>) -> HistoryItem
where
    Tz::Offset: std::fmt::Display,
{
    let time = match state.time.as_deref() {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => time_label(now),
    };
    HistoryItem {
        date: state.date.clone(),
        time,
        notification: state.notification.clone(),
        analogy: state.analogy.clone(),
        news: state.news.clone(),
        link: state.link.clone(),
    }
}
