//! Redis settings

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection and per-command settings for the Redis cache store.
///
/// `connect_attempts` and `backoff_base_ms` drive both the startup connect
/// loop and the retries of idempotent commands (GET, SET). Scripts that
/// mutate counters or challenges are never retried.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    pub url: String,

    /// Prepended to every key, e.g. `otp-auth:` gives `otp-auth:otp:0911...`
    pub key_prefix: String,

    pub connect_timeout_ms: u64,
    pub command_timeout_ms: u64,
    pub connect_attempts: u32,
    pub backoff_base_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".into(),
            key_prefix: String::new(),
            connect_timeout_ms: 5_000,
            command_timeout_ms: 2_000,
            connect_attempts: 3,
            backoff_base_ms: 100,
        }
    }
}

impl CacheConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// `None` when no prefix is configured
    pub fn key_prefix(&self) -> Option<&str> {
        Some(self.key_prefix.as_str()).filter(|p| !p.is_empty())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}
