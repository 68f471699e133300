// src/notify/webhook.rs
use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::{Notifier, Permission};

/// Posts `{"text": "..."}` to a chat webhook (Slack-compatible; Discord accepts
/// the same body on its `/slack` endpoint).
#[derive(Clone)]
pub struct WebhookNotifier {
    webhook_url: Option<String>,
    client: Client,
    timeout: Duration,
    max_retries: u8,
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            webhook_url: Some(url.into()),
            client: Client::new(),
            timeout: Duration::from_secs(5),
            max_retries: 3,
        }
    }

    /// Unconfigured notifier: permission is always `Denied`.
    pub fn disabled() -> Self {
        Self {
            webhook_url: None,
            ..Self::new(String::new())
        }
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    /// A configured URL is the grant; there is nobody to ask otherwise.
    fn permission(&self) -> Permission {
        if self.webhook_url.is_some() {
            Permission::Granted
        } else {
            Permission::Denied
        }
    }

    async fn request_permission(&self) -> Permission {
        self.permission()
    }

    async fn show(&self, title: &str, body: &str) -> Result<()> {
        let Some(url) = &self.webhook_url else {
            tracing::debug!("webhook disabled (no url configured)");
            return Ok(());
        };

        let text = format!("*{title}*\n{body}");
        let payload = WebhookPayload { text: &text };

        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let res = self
                .client
                .post(url)
                .timeout(self.timeout)
                .json(&payload)
                .send()
                .await;

            let err = match res {
                Ok(rsp) => match rsp.error_for_status() {
                    Ok(_) => return Ok(()),
                    Err(e) => anyhow!("webhook HTTP error: {e}"),
                },
                Err(e) => anyhow!("webhook request failed: {e}"),
            };

            if attempt >= self.max_retries {
                return Err(err);
            }
            tracing::debug!(attempt, "webhook retry: {err:#}");
            tokio::time::sleep(Duration::from_millis(500u64 << (attempt - 1))).await;
        }
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}
