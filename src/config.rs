// src/config.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::notify::{ConsoleNotifier, Notifier, Permission, WebhookNotifier};

const ENV_CONFIG_PATH: &str = "RADIANTIC_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/client.toml";

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_STATE_DIR: &str = "state";
pub const DEFAULT_POLL_PERIOD_MS: u64 = 2_000;
const MIN_POLL_PERIOD_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub backend_url: String,
    pub state_dir: PathBuf,
    pub poll_period_ms: u64,
    pub webhook_url: Option<String>,
    pub notify_permission: Permission,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            poll_period_ms: DEFAULT_POLL_PERIOD_MS,
            webhook_url: None,
            notify_permission: Permission::Default,
        }
    }
}

/// Optional file layer; every key may be omitted.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    backend_url: Option<String>,
    state_dir: Option<PathBuf>,
    poll_period_ms: Option<u64>,
    webhook_url: Option<String>,
    notify_permission: Option<String>,
}

impl ClientConfig {
    /// Defaults → TOML file → environment.
    ///
    /// File lookup: `$RADIANTIC_CONFIG` (must exist) then `config/client.toml`.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::default();
        if let Some(path) = config_path()? {
            let fc = read_file_config(&path)?;
            cfg.apply_file(fc);
            tracing::debug!(path = %path.display(), "config file applied");
        }
        cfg.apply_env();
        Ok(cfg)
    }

    /// Environment-only variant (no file lookup).
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.apply_env();
        cfg
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let fc: FileConfig = toml::from_str(s).context("parsing client config toml")?;
        let mut cfg = Self::default();
        cfg.apply_file(fc);
        Ok(cfg)
    }

    fn apply_file(&mut self, fc: FileConfig) {
        if let Some(u) = fc.backend_url {
            self.set_backend_url(&u);
        }
        if let Some(d) = fc.state_dir {
            self.state_dir = d;
        }
        if let Some(ms) = fc.poll_period_ms {
            self.poll_period_ms = sanitize_period(ms);
        }
        if let Some(u) = fc.webhook_url {
            self.set_webhook_url(&u);
        }
        if let Some(p) = fc.notify_permission {
            self.set_permission(&p);
        }
    }

    fn apply_env(&mut self) {
        if let Ok(u) = std::env::var("BACKEND_URL") {
            self.set_backend_url(&u);
        }
        if let Ok(d) = std::env::var("STATE_DIR") {
            if !d.trim().is_empty() {
                self.state_dir = PathBuf::from(d.trim());
            }
        }
        if let Ok(v) = std::env::var("POLL_PERIOD_MS") {
            match v.trim().parse::<u64>() {
                Ok(ms) => self.poll_period_ms = sanitize_period(ms),
                Err(_) => tracing::warn!(value = %v, "POLL_PERIOD_MS invalid, keeping {}", self.poll_period_ms),
            }
        }
        if let Ok(u) = std::env::var("NOTIFY_WEBHOOK_URL") {
            self.set_webhook_url(&u);
        }
        if let Ok(p) = std::env::var("NOTIFY_PERMISSION") {
            self.set_permission(&p);
        }
    }

    fn set_backend_url(&mut self, u: &str) {
        let u = u.trim().trim_end_matches('/');
        if !u.is_empty() {
            self.backend_url = u.to_string();
        }
    }

    fn set_webhook_url(&mut self, u: &str) {
        let u = u.trim();
        self.webhook_url = (!u.is_empty()).then(|| u.to_string());
    }

    fn set_permission(&mut self, p: &str) {
        match p.parse::<Permission>() {
            Ok(perm) => self.notify_permission = perm,
            Err(e) => tracing::warn!("{e:#}; keeping {}", self.notify_permission),
        }
    }

    pub fn poll_period(&self) -> Duration {
        Duration::from_millis(self.poll_period_ms)
    }

    /// Webhook when configured, otherwise the console starting at `console_permission`.
    pub fn build_notifier(&self, console_permission: Permission) -> Arc<dyn Notifier> {
        match &self.webhook_url {
            Some(url) => Arc::new(WebhookNotifier::new(url.clone())),
            None => Arc::new(ConsoleNotifier::new(console_permission)),
        }
    }
}

fn sanitize_period(ms: u64) -> u64 {
    if ms < MIN_POLL_PERIOD_MS {
        tracing::warn!(ms, "poll period too small, using {MIN_POLL_PERIOD_MS}ms");
        MIN_POLL_PERIOD_MS
    } else {
        ms
    }
}

fn config_path() -> Result<Option<PathBuf>> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return Ok(Some(pb));
        }
        anyhow::bail!("{ENV_CONFIG_PATH} points to non-existent path {}", pb.display());
    }
    let default = PathBuf::from(DEFAULT_CONFIG_PATH);
    Ok(default.exists().then_some(default))
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading client config from {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    const VARS: [&str; 6] = [
        ENV_CONFIG_PATH,
        "BACKEND_URL",
        "STATE_DIR",
        "POLL_PERIOD_MS",
        "NOTIFY_WEBHOOK_URL",
        "NOTIFY_PERMISSION",
    ];

    fn clear_env() {
        for v in VARS {
            env::remove_var(v);
        }
    }

    #[test]
    fn toml_layer_overrides_defaults() {
        let cfg = ClientConfig::from_toml_str(
            r#"
            backend_url = "https://agent.example/api/"
            poll_period_ms = 5
            notify_permission = "granted"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.backend_url, "https://agent.example/api");
        assert_eq!(cfg.poll_period_ms, MIN_POLL_PERIOD_MS);
        assert_eq!(cfg.notify_permission, Permission::Granted);
        assert_eq!(cfg.state_dir, PathBuf::from(DEFAULT_STATE_DIR));
    }

    #[serial_test::serial]
    #[test]
    fn env_wins_and_bad_numbers_keep_defaults() {
        clear_env();
        env::set_var("BACKEND_URL", "http://10.0.0.2:8000/api/");
        env::set_var("POLL_PERIOD_MS", "soon");
        env::set_var("NOTIFY_WEBHOOK_URL", "  ");
        let cfg = ClientConfig::from_env();
        assert_eq!(cfg.backend_url, "http://10.0.0.2:8000/api");
        assert_eq!(cfg.poll_period_ms, DEFAULT_POLL_PERIOD_MS);
        assert_eq!(cfg.webhook_url, None);
        clear_env();
    }

    #[serial_test::serial]
    #[test]
    fn explicit_config_path_must_exist() {
        clear_env();
        env::set_var(ENV_CONFIG_PATH, "/definitely/not/here.toml");
        assert!(ClientConfig::load().is_err());

        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("client.toml");
        fs::write(&p, "state_dir = \"/var/lib/radiantic\"\n").unwrap();
        env::set_var(ENV_CONFIG_PATH, p.display().to_string());
        env::set_var("STATE_DIR", "/tmp/override");
        let cfg = ClientConfig::load().unwrap();
        assert_eq!(cfg.state_dir, PathBuf::from("/tmp/override"));
        clear_env();
    }
}
