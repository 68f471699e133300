// src/notify/mod.rs
pub mod console;
pub mod webhook;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use metrics::counter;

pub use console::ConsoleNotifier;
pub use webhook::WebhookNotifier;

pub const NEW_RESEARCH_TITLE: &str = "New Research!";

/// Platform permission state for user-visible notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Permission {
    Granted,
    Denied,
    #[default]
    Default,
}

impl Permission {
    pub fn as_str(self) -> &'static str {
        match self {
            Permission::Granted => "granted",
            Permission::Denied => "denied",
            Permission::Default => "default",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "granted" => Ok(Permission::Granted),
            "denied" => Ok(Permission::Denied),
            "default" | "" => Ok(Permission::Default),
            other => anyhow::bail!("unknown notification permission: {other}"),
        }
    }
}

/// Host notification capability.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    fn permission(&self) -> Permission;
    /// Explicit, user-initiated permission flow.
    async fn request_permission(&self) -> Permission;
    async fn show(&self, title: &str, body: &str) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Fires notifications only when permission is exactly `Granted`. Never asks for
/// permission on its own.
#[derive(Clone)]
pub struct Dispatcher {
    notifier: Arc<dyn Notifier>,
}

impl Dispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Returns true when the notification was handed to the platform.
    pub async fn dispatch(&self, title: &str, body: &str) -> bool {
        let perm = self.notifier.permission();
        if perm != Permission::Granted {
            tracing::debug!(permission = %perm, "notification suppressed");
            return false;
        }
        match self.notifier.show(title, body).await {
            Ok(()) => {
                counter!("notifications_sent_total").increment(1);
                true
            }
            Err(e) => {
                tracing::warn!(notifier = self.notifier.name(), "notification failed: {e:#}");
                false
            }
        }
    }

    pub async fn request_permission(&self) -> Permission {
        let perm = self.notifier.request_permission().await;
        tracing::info!(notifier = self.notifier.name(), permission = %perm, "permission requested");
        perm
    }

    pub fn permission(&self) -> Permission {
        self.notifier.permission()
    }
}
