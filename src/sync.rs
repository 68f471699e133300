// src/sync.rs
//! One poll tick: fetch → classify → dedup/commit → notify → render.

use std::sync::Arc;

use chrono::Local;
use metrics::counter;
use once_cell::sync::OnceCell;

use crate::engine::{DedupEngine, EngineOutcome, SkipReason};
use crate::model::{AgentStatus, RemoteState};
use crate::notify::{Dispatcher, NEW_RESEARCH_TITLE};
use crate::remote::{FetchError, StateSource};
use crate::store::PersistentStore;
use crate::view::{RenderEvent, View, CONNECTING_TEXT};

/// One-time metrics registration.
fn ensure_metrics_described() {
    use metrics::{describe_counter, describe_gauge};
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("poll_ticks_total", "Poll ticks executed.");
        describe_counter!("poll_errors_total", "Ticks whose fetch failed.");
        describe_counter!("history_commits_total", "New items appended to history.");
        describe_counter!("dedup_skipped_total", "Settled states that produced no commit.");
        describe_counter!("notifications_sent_total", "Notifications handed to the platform.");
        describe_gauge!("history_len", "Stored history length after the last commit.");
    });
}

/// What a tick did; mostly for logs and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Fetch failed; view shows "Connecting...".
    Unreachable,
    /// View went away while the fetch was in flight; result dropped.
    Discarded,
    Busy,
    Skipped(SkipReason),
    Committed { notified: bool },
}

pub struct Synchronizer {
    source: Arc<dyn StateSource>,
    store: PersistentStore,
    engine: DedupEngine,
    dispatcher: Dispatcher,
}

impl Synchronizer {
    pub fn new(source: Arc<dyn StateSource>, store: PersistentStore, dispatcher: Dispatcher) -> Self {
        ensure_metrics_described();
        Self {
            source,
            store,
            engine: DedupEngine::new(),
            dispatcher,
        }
    }

    pub fn engine(&self) -> &DedupEngine {
        &self.engine
    }

    pub fn store(&self) -> &PersistentStore {
        &self.store
    }

    /// Handle for fetching without holding the synchronizer.
    pub fn source(&self) -> Arc<dyn StateSource> {
        Arc::clone(&self.source)
    }

    /// Run one poll. Never fails: fetch errors become a neutral status.
    pub async fn tick(&mut self, view: &dyn View) -> TickOutcome {
        let fetched = self.source.fetch_state().await;
        self.apply_fetched(fetched, view).await
    }

    /// Second half of a tick, for a fetch performed elsewhere.
    pub async fn apply_fetched(
        &mut self,
        fetched: Result<RemoteState, FetchError>,
        view: &dyn View,
    ) -> TickOutcome {
        counter!("poll_ticks_total").increment(1);

        if !view.is_active() {
            tracing::debug!("view inactive, dropping fetched state");
            return TickOutcome::Discarded;
        }

        match fetched {
            Ok(state) => self.apply(state, view).await,
            Err(e) => {
                counter!("poll_errors_total").increment(1);
                match &e {
                    FetchError::MalformedResponse(_) => tracing::warn!("poll tick failed: {e}"),
                    _ => tracing::debug!("poll tick failed: {e}"),
                }
                view.render(RenderEvent::Status {
                    status: AgentStatus::Connecting,
                    text: CONNECTING_TEXT.to_string(),
                    detail: None,
                });
                TickOutcome::Unreachable
            }
        }
    }

    async fn apply(&mut self, state: RemoteState, view: &dyn View) -> TickOutcome {
        let status = state.agent_status();
        view.render(RenderEvent::Status {
            status,
            text: state.status.clone(),
            detail: Some(state.clone()),
        });

        if !status.is_settled() {
            return TickOutcome::Busy;
        }

        match self.engine.process(&state, &self.store, Local::now()).await {
            EngineOutcome::Skipped(reason) => TickOutcome::Skipped(reason),
            EngineOutcome::Committed {
                item,
                history,
                notify,
            } => {
                view.render(RenderEvent::History(history));
                let notified = if notify {
                    self.dispatcher
                        .dispatch(NEW_RESEARCH_TITLE, &item.notification)
                        .await
                } else {
                    false
                };
                TickOutcome::Committed { notified }
            }
        }
    }
}
