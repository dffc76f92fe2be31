//! Cache store seam used by the OTP manager and the rate limiter

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::domain::entities::WindowAttempt;
use crate::errors::DomainResult;

/// TTL applied by a successful compare-and-set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasTtl {
    /// Expire `Duration` after the write
    Reset(Duration),
    /// Keep the key's current expiry; only meaningful when the key exists
    Keep,
}

/// One write of a transactional batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub key: String,
    pub value: String,
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>, ttl: Duration) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            ttl,
        }
    }
}

/// Shared key-value store with per-key TTL and atomic primitives
///
/// Failures of the backing store are reported as
/// `DomainError::Infrastructure`; implementations never turn them into
/// "absent" or "not swapped".
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read a value; expired keys read as absent
    async fn get(&self, key: &str) -> DomainResult<Option<String>>;

    /// Unconditionally write a value with a TTL
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> DomainResult<()>;

    /// Atomically increment an integer counter, setting `ttl` only when the
    /// counter is created by this call. Returns the new value.
    async fn increment_with_ttl(&self, key: &str, ttl: Duration) -> DomainResult<i64>;

    /// Write every entry or none of them
    async fn transactional_set(&self, batch: &[CacheEntry]) -> DomainResult<()>;

    /// Atomically replace the value of `key` with `value` if its current
    /// value equals `expected` (`None` meaning the key is absent).
    /// Returns whether the swap happened.
    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
        ttl: CasTtl,
    ) -> DomainResult<bool>;

    /// Count one attempt in the fixed window stored under `key`, as one
    /// atomic step. An absent or elapsed window is replaced by a new one
    /// opened at `now` that expires after `window`; a counted attempt keeps
    /// the current expiry, and an exhausted window is not written.
    ///
    /// A stored value that is not a window is an infrastructure error.
    async fn consume_window_attempt(
        &self,
        key: &str,
        now: DateTime<Utc>,
        window: Duration,
        max_attempts: u32,
    ) -> DomainResult<WindowAttempt>;
}
