// src/poller.rs
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{interval, MissedTickBehavior};

use crate::remote::StateSource;
use crate::sync::Synchronizer;
use crate::view::{RenderEvent, View};

pub const DEFAULT_POLL_PERIOD: Duration = Duration::from_secs(2);

struct Cadence {
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Drives `Synchronizer::tick` on a fixed period while a view is showing.
///
/// At most one cadence exists; `start` while running replaces it. Each tick
/// fetches on its own task, so a hung request does not hold up later ticks;
/// applying results goes through one synchronizer lock and never overlaps, even
/// across a restart.
pub struct Poller {
    sync: Arc<Mutex<Synchronizer>>,
    period: Duration,
    cadence: Option<Cadence>,
}

impl Poller {
    pub fn new(sync: Synchronizer) -> Self {
        Self::with_period(sync, DEFAULT_POLL_PERIOD)
    }

    pub fn with_period(sync: Synchronizer, period: Duration) -> Self {
        Self {
            sync: Arc::new(Mutex::new(sync)),
            period,
            cadence: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn synchronizer(&self) -> Arc<Mutex<Synchronizer>> {
        Arc::clone(&self.sync)
    }

    /// Tick immediately, then every period. Cancels any previous cadence.
    pub fn start(&mut self, view: Arc<dyn View>) {
        if self.cadence.is_some() {
            tracing::debug!("poller restart");
        }
        self.stop();

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(run_cadence(Arc::clone(&self.sync), view, self.period, rx));
        self.cadence = Some(Cadence { stop: tx, handle });
        tracing::info!(period_ms = self.period.as_millis() as u64, "polling started");
    }

    /// Prevents further ticks. A fetch already in flight completes and its
    /// result is dropped. No-op when not running.
    pub fn stop(&mut self) {
        if let Some(c) = self.cadence.take() {
            let _ = c.stop.send(true);
            tracing::info!("polling stopped");
        }
    }

    /// True while a cadence is live (it also ends on its own when the view
    /// reports inactive).
    pub fn is_running(&self) -> bool {
        self.cadence
            .as_ref()
            .is_some_and(|c| !c.handle.is_finished())
    }

    /// Stop and wait for the cadence task to wind down.
    pub async fn shutdown(&mut self) {
        if let Some(c) = self.cadence.take() {
            let _ = c.stop.send(true);
            if let Err(e) = c.handle.await {
                tracing::warn!("poll task ended abnormally: {e}");
            }
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The caller's view, additionally closed once this cadence is stopped.
struct Gate {
    view: Arc<dyn View>,
    stop: watch::Receiver<bool>,
}

impl View for Gate {
    fn render(&self, event: RenderEvent) {
        self.view.render(event)
    }

    fn is_active(&self) -> bool {
        !*self.stop.borrow() && self.view.is_active()
    }
}

async fn run_cadence(
    sync: Arc<Mutex<Synchronizer>>,
    view: Arc<dyn View>,
    period: Duration,
    mut stop: watch::Receiver<bool>,
) {
    let gate = Arc::new(Gate {
        view,
        stop: stop.clone(),
    });
    let source = sync.lock().await.source();
    let newest = Arc::new(AtomicU64::new(0));
    let mut in_flight = JoinSet::new();
    let mut seq = 0u64;

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            // Err means the poller itself is gone.
            _ = stop.changed() => break,
            _ = ticker.tick() => {}
        }
        while in_flight.try_join_next().is_some() {}

        if !gate.is_active() {
            tracing::info!("view no longer active, polling ends");
            break;
        }

        seq += 1;
        in_flight.spawn(run_tick(
            seq,
            Arc::clone(&source),
            Arc::clone(&sync),
            Arc::clone(&gate),
            Arc::clone(&newest),
        ));
    }

    // Fetches still in flight run to completion; the closed gate drops their results.
    in_flight.detach_all();
}

/// Fetch outside the synchronizer lock so a hung request only stalls its own
/// tick. Results older than one already applied are dropped.
async fn run_tick(
    seq: u64,
    source: Arc<dyn StateSource>,
    sync: Arc<Mutex<Synchronizer>>,
    gate: Arc<Gate>,
    newest: Arc<AtomicU64>,
) {
    let fetched = source.fetch_state().await;

    let mut sync = sync.lock().await;
    if newest.load(Ordering::SeqCst) > seq {
        tracing::debug!(seq, "stale poll result dropped");
        return;
    }
    newest.store(seq, Ordering::SeqCst);

    let outcome = sync.apply_fetched(fetched, gate.as_ref()).await;
    tracing::trace!(seq, ?outcome, "tick");
}
