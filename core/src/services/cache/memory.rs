//! In-process cache store
//!
//! Used for tests and for running the service without Redis. Every operation
//! runs under one mutex, which gives the same atomicity the Redis scripts
//! provide. Expiry is evaluated against the injected [`Clock`]; expired keys
//! are dropped when touched and swept from the whole map on writes at most
//! once per [`SWEEP_INTERVAL`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::domain::entities::{RateLimitWindow, WindowAttempt};
use crate::errors::{DomainResult, InfraError};
use crate::services::clock::{Clock, SystemClock};

use super::traits::{CacheEntry, CacheStore, CasTtl};

/// Minimum time between two full sweeps of expired entries
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl StoredValue {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

struct Entries {
    values: HashMap<String, StoredValue>,
    last_sweep: DateTime<Utc>,
}

impl Entries {
    /// Live value of `key`, dropping it if it has expired
    fn live(&mut self, key: &str, now: DateTime<Utc>) -> Option<&mut StoredValue> {
        if self.values.get(key).is_some_and(|stored| !stored.is_live(now)) {
            self.values.remove(key);
        }
        self.values.get_mut(key)
    }

    fn sweep_if_due(&mut self, now: DateTime<Utc>) {
        let due = chrono::Duration::from_std(SWEEP_INTERVAL).map_or(true, |interval| now - self.last_sweep >= interval);
        if !due {
            return;
        }
        let before = self.values.len();
        self.values.retain(|_, stored| stored.is_live(now));
        self.last_sweep = now;

        let swept = before - self.values.len();
        if swept > 0 {
            tracing::debug!(swept, remaining = self.values.len(), "Swept expired cache entries");
        }
    }

    fn insert(&mut self, key: &str, value: String, expires_at: Option<DateTime<Utc>>) {
        self.values.insert(key.to_string(), StoredValue { value, expires_at });
    }
}

pub struct InMemoryCacheStore {
    entries: Mutex<Entries>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(Entries {
                values: HashMap::new(),
                last_sweep: clock.now(),
            }),
            clock,
        }
    }

    /// Number of stored entries, expired ones not yet swept included
    pub fn entry_count(&self) -> DomainResult<usize> {
        Ok(self.lock()?.values.len())
    }

    fn lock(&self) -> DomainResult<MutexGuard<'_, Entries>> {
        self.entries.lock().map_err(|_| {
            InfraError::Cache {
                message: "in-memory cache lock poisoned".to_string(),
            }
            .into()
        })
    }

    /// Lock for a write at `now`, sweeping first when a sweep is due
    fn lock_for_write(&self, now: DateTime<Utc>) -> DomainResult<MutexGuard<'_, Entries>> {
        let mut entries = self.lock()?;
        entries.sweep_if_due(now);
        Ok(entries)
    }

    fn expiry_after(&self, now: DateTime<Utc>, ttl: Duration) -> DomainResult<DateTime<Utc>> {
        let ttl = chrono::Duration::from_std(ttl).map_err(|e| InfraError::Cache {
            message: format!("ttl out of range: {}", e),
        })?;
        Ok(now + ttl)
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> DomainResult<Option<String>> {
        let now = self.clock.now();
        let mut entries = self.lock()?;
        Ok(entries.live(key, now).map(|stored| stored.value.clone()))
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> DomainResult<()> {
        let now = self.clock.now();
        let expires_at = self.expiry_after(now, ttl)?;
        let mut entries = self.lock_for_write(now)?;
        entries.insert(key, value.to_string(), Some(expires_at));
        Ok(())
    }

    async fn increment_with_ttl(&self, key: &str, ttl: Duration) -> DomainResult<i64> {
        let now = self.clock.now();
        let expires_at = self.expiry_after(now, ttl)?;
        let mut entries = self.lock_for_write(now)?;

        match entries.live(key, now) {
            Some(stored) => {
                let current: i64 = stored.value.parse().map_err(|_| InfraError::Serialization {
                    message: format!("value at {} is not an integer", key),
                })?;
                let next = current + 1;
                stored.value = next.to_string();
                Ok(next)
            }
            None => {
                entries.insert(key, "1".to_string(), Some(expires_at));
                Ok(1)
            }
        }
    }

    async fn transactional_set(&self, batch: &[CacheEntry]) -> DomainResult<()> {
        let now = self.clock.now();
        let prepared = batch
            .iter()
            .map(|entry| {
                Ok((
                    entry.key.clone(),
                    StoredValue {
                        value: entry.value.clone(),
                        expires_at: Some(self.expiry_after(now, entry.ttl)?),
                    },
                ))
            })
            .collect::<DomainResult<Vec<_>>>()?;

        let mut entries = self.lock_for_write(now)?;
        entries.values.extend(prepared);
        Ok(())
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
        ttl: CasTtl,
    ) -> DomainResult<bool> {
        let now = self.clock.now();
        let reset_expiry = match ttl {
            CasTtl::Reset(ttl) => Some(self.expiry_after(now, ttl)?),
            CasTtl::Keep => None,
        };
        let mut entries = self.lock_for_write(now)?;

        let current = entries.live(key, now);
        let matches = match (&current, expected) {
            (None, None) => true,
            (Some(stored), Some(expected)) => stored.value == expected,
            _ => false,
        };
        if !matches {
            return Ok(false);
        }

        let expires_at = match reset_expiry {
            Some(at) => Some(at),
            None => current.and_then(|stored| stored.expires_at),
        };
        entries.insert(key, value.to_string(), expires_at);
        Ok(true)
    }

    async fn consume_window_attempt(
        &self,
        key: &str,
        now: DateTime<Utc>,
        window: Duration,
        max_attempts: u32,
    ) -> DomainResult<WindowAttempt> {
        let window_len = chrono::Duration::from_std(window).map_err(|e| InfraError::Cache {
            message: format!("window out of range: {}", e),
        })?;
        let mut entries = self.lock_for_write(now)?;

        let (current, expires_at) = match entries.live(key, now) {
            Some(stored) => (
                Some(serde_json::from_str::<RateLimitWindow>(&stored.value)?),
                stored.expires_at,
            ),
            None => (None, None),
        };

        let attempt = RateLimitWindow::consume(current, now, window_len, max_attempts);
        if let WindowAttempt::Counted(next) = attempt {
            let expires_at = match current {
                Some(previous) if previous.same_window(&next) => expires_at,
                _ => Some(now + window_len),
            };
            entries.insert(key, serde_json::to_string(&next)?, expires_at);
        }
        Ok(attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::clock::ManualClock;

    fn store() -> (InMemoryCacheStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        (InMemoryCacheStore::with_clock(clock.clone()), clock)
    }

    #[tokio::test]
    async fn test_values_expire_with_ttl() {
        let (store, clock) = store();
        store.set_with_ttl("k", "v", Duration::from_secs(10)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));

        clock.advance(chrono::Duration::seconds(10));
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_compare_and_set_on_absent_key() {
        let (store, _) = store();
        let ttl = CasTtl::Reset(Duration::from_secs(60));
        assert!(store.compare_and_set("k", None, "a", ttl).await.unwrap());
        // Present now, so a second set-if-absent loses
        assert!(!store.compare_and_set("k", None, "b", ttl).await.unwrap());
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_compare_and_set_requires_expected_value() {
        let (store, _) = store();
        store.set_with_ttl("k", "a", Duration::from_secs(60)).await.unwrap();

        assert!(!store
            .compare_and_set("k", Some("stale"), "b", CasTtl::Keep)
            .await
            .unwrap());
        assert!(store.compare_and_set("k", Some("a"), "b", CasTtl::Keep).await.unwrap());
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_keep_ttl_preserves_expiry() {
        let (store, clock) = store();
        store.set_with_ttl("k", "a", Duration::from_secs(60)).await.unwrap();
        clock.advance(chrono::Duration::seconds(50));
        assert!(store.compare_and_set("k", Some("a"), "b", CasTtl::Keep).await.unwrap());

        clock.advance(chrono::Duration::seconds(10));
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_key_counts_as_absent_for_compare_and_set() {
        let (store, clock) = store();
        store.set_with_ttl("k", "old", Duration::from_secs(5)).await.unwrap();
        clock.advance(chrono::Duration::seconds(6));

        assert!(!store
            .compare_and_set("k", Some("old"), "new", CasTtl::Keep)
            .await
            .unwrap());
        assert!(store
            .compare_and_set("k", None, "new", CasTtl::Reset(Duration::from_secs(5)))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_increment_sets_ttl_only_on_create() {
        let (store, clock) = store();
        let ttl = Duration::from_secs(30);
        assert_eq!(store.increment_with_ttl("n", ttl).await.unwrap(), 1);
        clock.advance(chrono::Duration::seconds(20));
        assert_eq!(store.increment_with_ttl("n", ttl).await.unwrap(), 2);

        // Still expires 30s after the first increment
        clock.advance(chrono::Duration::seconds(10));
        assert_eq!(store.increment_with_ttl("n", ttl).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_increment_rejects_non_integer() {
        let (store, _) = store();
        store.set_with_ttl("n", "abc", Duration::from_secs(30)).await.unwrap();
        let err = store.increment_with_ttl("n", Duration::from_secs(30)).await.unwrap_err();
        assert!(err.is_infrastructure());
    }

    #[tokio::test]
    async fn test_window_attempt_keeps_expiry_until_window_ends() {
        let (store, clock) = store();
        let window = Duration::from_secs(600);
        let start = clock.now();

        let first = store.consume_window_attempt("w", start, window, 2).await.unwrap();
        assert_eq!(first, WindowAttempt::Counted(RateLimitWindow::start(start)));

        clock.advance(chrono::Duration::seconds(300));
        let second = store.consume_window_attempt("w", clock.now(), window, 2).await.unwrap();
        assert_eq!(second.window().attempt_count, 2);
        assert!(matches!(
            store.consume_window_attempt("w", clock.now(), window, 2).await.unwrap(),
            WindowAttempt::Refused(w) if w.attempt_count == 2
        ));

        // Expiry still follows the window start, not the last attempt
        clock.advance(chrono::Duration::seconds(300));
        assert_eq!(store.get("w").await.unwrap(), None);
        let reopened = store.consume_window_attempt("w", clock.now(), window, 2).await.unwrap();
        assert_eq!(reopened, WindowAttempt::Counted(RateLimitWindow::start(clock.now())));
    }

    #[tokio::test]
    async fn test_window_attempt_rejects_foreign_value() {
        let (store, clock) = store();
        store.set_with_ttl("w", "garbage", Duration::from_secs(60)).await.unwrap();
        let err = store
            .consume_window_attempt("w", clock.now(), Duration::from_secs(60), 3)
            .await
            .unwrap_err();
        assert!(err.is_infrastructure());
        assert_eq!(store.get("w").await.unwrap().as_deref(), Some("garbage"));
    }

    #[tokio::test]
    async fn test_writes_sweep_expired_entries() {
        let (store, clock) = store();
        for key in ["otp:1", "otp:2", "otp:3"] {
            store.set_with_ttl(key, "v", Duration::from_secs(10)).await.unwrap();
        }
        assert_eq!(store.entry_count().unwrap(), 3);

        // Reads never sweep
        clock.advance(chrono::Duration::seconds(61));
        assert_eq!(store.get("otp:4").await.unwrap(), None);
        assert_eq!(store.entry_count().unwrap(), 3);

        store.set_with_ttl("otp:4", "v", Duration::from_secs(10)).await.unwrap();
        assert_eq!(store.entry_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_sweep_waits_for_interval() {
        let (store, clock) = store();
        store.set_with_ttl("a", "v", Duration::from_secs(1)).await.unwrap();
        clock.advance(chrono::Duration::seconds(30));
        store.set_with_ttl("b", "v", Duration::from_secs(600)).await.unwrap();
        assert_eq!(store.entry_count().unwrap(), 2);

        clock.advance(chrono::Duration::seconds(30));
        store.set_with_ttl("c", "v", Duration::from_secs(600)).await.unwrap();
        assert_eq!(store.entry_count().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_transactional_set_writes_all_entries() {
        let (store, _) = store();
        let batch = vec![
            CacheEntry::new("a", "1", Duration::from_secs(10)),
            CacheEntry::new("b", "2", Duration::from_secs(10)),
        ];
        store.transactional_set(&batch).await.unwrap();
        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("1"));
        assert_eq!(store.get("b").await.unwrap().as_deref(), Some("2"));
    }
}
