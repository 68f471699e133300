// src/remote.rs
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::model::RemoteState;

pub const MIN_INTERVAL_MINUTES: u32 = 1;
pub const MAX_INTERVAL_MINUTES: u32 = 60;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transport failure or non-2xx status.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    /// Body could not be decoded into the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("interval {0} outside 1..=60 minutes")]
    InvalidInterval(u32),
}

/// One request/response round trip to the agent. No retry, no caching.
#[async_trait]
pub trait StateSource: Send + Sync {
    async fn fetch_state(&self) -> Result<RemoteState, FetchError>;
}

#[derive(Debug, Serialize)]
struct ConfigPush {
    interval_minutes: u32,
}

/// Backend acknowledgement for `POST /config`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConfigAck {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub interval_seconds: u64,
}

#[derive(Clone)]
pub struct HttpStateClient {
    base_url: String,
    client: Client,
}

impl HttpStateClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Push the server-side research cadence. Fire-and-forget from the caller's
    /// point of view: nothing here retries.
    pub async fn push_interval(&self, minutes: u32) -> Result<Option<ConfigAck>, FetchError> {
        if !(MIN_INTERVAL_MINUTES..=MAX_INTERVAL_MINUTES).contains(&minutes) {
            return Err(FetchError::InvalidInterval(minutes));
        }
        let url = format!("{}/config", self.base_url);
        let rsp = self
            .client
            .post(&url)
            .json(&ConfigPush {
                interval_minutes: minutes,
            })
            .send()
            .await
            .map_err(|e| FetchError::BackendUnavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| FetchError::BackendUnavailable(e.to_string()))?;

        // The ack is informational; an odd body does not undo the push.
        let ack = rsp.json::<ConfigAck>().await.ok();
        tracing::info!(minutes, ?ack, "research interval pushed");
        Ok(ack)
    }
}

#[async_trait]
impl StateSource for HttpStateClient {
    async fn fetch_state(&self) -> Result<RemoteState, FetchError> {
        let url = format!("{}/latest", self.base_url);
        let rsp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::BackendUnavailable(e.to_string()))?;

        let status = rsp.status();
        if !status.is_success() {
            return Err(FetchError::BackendUnavailable(format!("status {status}")));
        }

        let body = rsp
            .text()
            .await
            .map_err(|e| FetchError::BackendUnavailable(e.to_string()))?;

        serde_json::from_str::<RemoteState>(body.trim())
            .map_err(|e| FetchError::MalformedResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let c = HttpStateClient::new("http://localhost:8000/api/");
        assert_eq!(c.base_url(), "http://localhost:8000/api");
    }

    #[tokio::test]
    async fn interval_out_of_range_is_rejected_locally() {
        let c = HttpStateClient::new("http://127.0.0.1:9");
        let err = c.push_interval(0).await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidInterval(0)));
        let err = c.push_interval(61).await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidInterval(61)));
    }
}
