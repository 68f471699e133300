// tests/common/mod.rs
// Fakes shared by the integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use radiantic_client::notify::{Dispatcher, Notifier, Permission};
use radiantic_client::{
    FetchError, MemoryStore, PersistentStore, RemoteState, RenderEvent, StateSource, Synchronizer,
    View,
};

#[derive(Debug, Clone)]
pub enum Reply {
    State(RemoteState),
    Down,
    Garbage,
}

/// Plays replies in order; the last one repeats forever.
pub struct ScriptedSource {
    replies: Mutex<VecDeque<Reply>>,
    last: Mutex<Reply>,
    pub calls: AtomicUsize,
    delay: Option<Duration>,
}

impl ScriptedSource {
    pub fn new(replies: Vec<Reply>) -> Arc<Self> {
        Self::build(replies, None)
    }

    /// Each fetch sleeps `delay` first (use with paused time).
    pub fn slow(replies: Vec<Reply>, delay: Duration) -> Arc<Self> {
        Self::build(replies, Some(delay))
    }

    fn build(replies: Vec<Reply>, delay: Option<Duration>) -> Arc<Self> {
        let last = replies.last().cloned().unwrap_or(Reply::Down);
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            last: Mutex::new(last),
            calls: AtomicUsize::new(0),
            delay,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl StateSource for ScriptedSource {
    async fn fetch_state(&self) -> Result<RemoteState, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        let next = self.replies.lock().unwrap().pop_front();
        let reply = next.unwrap_or_else(|| self.last.lock().unwrap().clone());
        match reply {
            Reply::State(s) => Ok(s),
            Reply::Down => Err(FetchError::BackendUnavailable("connection refused".into())),
            Reply::Garbage => Err(FetchError::MalformedResponse("expected value".into())),
        }
    }
}

pub struct RecordingNotifier {
    pub perm: Permission,
    pub shown: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn new(perm: Permission) -> Arc<Self> {
        Arc::new(Self {
            perm,
            shown: Mutex::new(vec![]),
        })
    }

    pub fn count(&self) -> usize {
        self.shown.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    fn permission(&self) -> Permission {
        self.perm
    }
    async fn request_permission(&self) -> Permission {
        self.perm
    }
    async fn show(&self, title: &str, body: &str) -> anyhow::Result<()> {
        self.shown
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
    fn name(&self) -> &'static str {
        "recording"
    }
}

pub struct RecordingView {
    pub events: Mutex<Vec<RenderEvent>>,
    pub active: AtomicBool,
}

impl RecordingView {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(vec![]),
            active: AtomicBool::new(true),
        })
    }

    pub fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<RenderEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl View for RecordingView {
    fn render(&self, event: RenderEvent) {
        self.events.lock().unwrap().push(event);
    }
    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

pub fn settled(text: &str) -> RemoteState {
    RemoteState {
        status: "Success".into(),
        notification: text.into(),
        analogy: "Think of it like...".into(),
        news: "Full Title: ...".into(),
        link: "https://arxiv.org/pdf/2410.00001".into(),
        date: "Oct 18, 2026".into(),
        time: Some("06:30 PM".into()),
    }
}

pub fn busy(text: &str) -> RemoteState {
    RemoteState {
        status: "🔍 Agent 1: Scanning Arxiv...".into(),
        ..settled(text)
    }
}

pub fn memory_store() -> (MemoryStore, PersistentStore) {
    let kv = MemoryStore::new();
    let store = PersistentStore::new(Arc::new(kv.clone()));
    (kv, store)
}

pub fn synchronizer(
    source: Arc<dyn StateSource>,
    store: PersistentStore,
    notifier: Arc<RecordingNotifier>,
) -> Synchronizer {
    Synchronizer::new(source, store, Dispatcher::new(notifier))
}
