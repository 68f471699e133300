// src/view.rs
//! Render callback contract between the sync core and whatever draws it.

use crate::model::{AgentStatus, History, RemoteState};

/// Status line shown while the backend cannot be reached.
pub const CONNECTING_TEXT: &str = "Connecting...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEvent {
    Status {
        status: AgentStatus,
        /// Raw status line, or `CONNECTING_TEXT` after a failed fetch.
        text: String,
        detail: Option<RemoteState>,
    },
    /// Emitted after a commit with the full updated history.
    History(History),
}

pub trait View: Send + Sync {
    fn render(&self, event: RenderEvent);

    /// Polling stops once this returns false.
    fn is_active(&self) -> bool {
        true
    }
}

impl<F> View for F
where
    F: Fn(RenderEvent) + Send + Sync,
{
    fn render(&self, event: RenderEvent) {
        self(event)
    }
}
