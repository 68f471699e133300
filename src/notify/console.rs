// src/notify/console.rs
use std::sync::Mutex;

use anyhow::Result;

use super::{Notifier, Permission};

/// Terminal "platform": prints notifications to stdout.
///
/// Permission starts from configuration. Requesting it grants unless the user
/// configured `denied`, which is sticky like a browser block.
pub struct ConsoleNotifier {
    perm: Mutex<Permission>,
}

impl ConsoleNotifier {
    pub fn new(initial: Permission) -> Self {
        Self {
            perm: Mutex::new(initial),
        }
    }
}

#[async_trait::async_trait]
impl Notifier for ConsoleNotifier {
    fn permission(&self) -> Permission {
        *self.perm.lock().expect("permission mutex poisoned")
    }

    async fn request_permission(&self) -> Permission {
        let mut p = self.perm.lock().expect("permission mutex poisoned");
        if *p != Permission::Denied {
            *p = Permission::Granted;
        }
        *p
    }

    async fn show(&self, title: &str, body: &str) -> Result<()> {
        println!("🔔 {title}\n   {body}");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "console"
    }
}
