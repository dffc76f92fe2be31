//! Redis implementation of the core `CacheStore`
//!
//! Reads and plain writes map to single commands. The atomic primitives run
//! as Lua scripts so that the read and the write happen inside Redis.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use redis::{AsyncCommands, Script};
use std::time::Duration;

use otp_core::domain::entities::{RateLimitWindow, WindowAttempt};
use otp_core::errors::DomainResult;
use otp_core::services::cache::{CacheEntry, CacheStore, CasTtl};

use super::redis_client::RedisClient;

static COMPARE_AND_SET: Lazy<Script> = Lazy::new(|| Script::new(include_str!("scripts/compare_and_set.lua")));

static INCREMENT_WITH_TTL: Lazy<Script> =
    Lazy::new(|| Script::new(include_str!("scripts/increment_with_ttl.lua")));

static CONSUME_WINDOW: Lazy<Script> = Lazy::new(|| Script::new(include_str!("scripts/consume_window.lua")));

/// `CacheStore` backed by a shared Redis instance
#[derive(Clone)]
pub struct RedisCacheStore {
    client: RedisClient,
}

impl RedisCacheStore {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RedisClient {
        &self.client
    }
}

/// PX argument for a TTL; Redis rejects zero
pub(crate) fn ttl_millis(ttl: Duration) -> u64 {
    (ttl.as_millis() as u64).max(1)
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> DomainResult<Option<String>> {
        let key = self.client.key(key);
        let value = self
            .client
            .execute_idempotent("GET", move |mut conn| {
                let key = key.clone();
                Box::pin(async move { conn.get::<_, Option<String>>(key).await })
            })
            .await?;
        Ok(value)
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> DomainResult<()> {
        let key = self.client.key(key);
        let value = value.to_string();
        let millis = ttl_millis(ttl);

        self.client
            .execute_idempotent("SET", move |mut conn| {
                let key = key.clone();
                let value = value.clone();
                Box::pin(async move {
                    redis::cmd("SET")
                        .arg(key)
                        .arg(value)
                        .arg("PX")
                        .arg(millis)
                        .query_async::<_, ()>(&mut conn)
                        .await
                })
            })
            .await?;
        Ok(())
    }

    async fn increment_with_ttl(&self, key: &str, ttl: Duration) -> DomainResult<i64> {
        let key = self.client.key(key);
        let millis = ttl_millis(ttl);

        let count = self
            .client
            .execute_once("INCR", move |mut conn| {
                let mut invocation = INCREMENT_WITH_TTL.prepare_invoke();
                invocation.key(key.clone()).arg(millis);
                Box::pin(async move { invocation.invoke_async::<_, i64>(&mut conn).await })
            })
            .await?;
        Ok(count)
    }

    async fn transactional_set(&self, batch: &[CacheEntry]) -> DomainResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut pipe = redis::pipe();
        pipe.atomic();
        for entry in batch {
            pipe.cmd("SET")
                .arg(self.client.key(&entry.key))
                .arg(&entry.value)
                .arg("PX")
                .arg(ttl_millis(entry.ttl))
                .ignore();
        }

        self.client
            .execute_idempotent("MULTI SET", move |mut conn| {
                let pipe = pipe.clone();
                Box::pin(async move { pipe.query_async::<_, ()>(&mut conn).await })
            })
            .await?;
        Ok(())
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
        ttl: CasTtl,
    ) -> DomainResult<bool> {
        let key = self.client.key(key);
        let (has_expected, expected) = match expected {
            Some(expected) => ("1", expected.to_string()),
            None => ("0", String::new()),
        };
        let value = value.to_string();
        let ttl_arg = match ttl {
            CasTtl::Reset(ttl) => ttl_millis(ttl).to_string(),
            CasTtl::Keep => "KEEP".to_string(),
        };

        let swapped = self
            .client
            .execute_once("CAS", move |mut conn| {
                let mut invocation = COMPARE_AND_SET.prepare_invoke();
                invocation
                    .key(key.clone())
                    .arg(has_expected)
                    .arg(expected.clone())
                    .arg(value.clone())
                    .arg(ttl_arg.clone());
                Box::pin(async move { invocation.invoke_async::<_, i64>(&mut conn).await })
            })
            .await?;
        Ok(swapped == 1)
    }

    async fn consume_window_attempt(
        &self,
        key: &str,
        now: DateTime<Utc>,
        window: Duration,
        max_attempts: u32,
    ) -> DomainResult<WindowAttempt> {
        let key = self.client.key(key);
        let now_ms = now.timestamp_millis();
        let window_ms = ttl_millis(window);

        let (counted, window_start_ms, attempt_count) = self
            .client
            .execute_once("WINDOW", move |mut conn| {
                let mut invocation = CONSUME_WINDOW.prepare_invoke();
                invocation.key(key.clone()).arg(now_ms).arg(window_ms).arg(max_attempts);
                Box::pin(async move { invocation.invoke_async::<_, (i64, i64, u32)>(&mut conn).await })
            })
            .await?;

        let current = RateLimitWindow {
            window_start_ms,
            attempt_count,
        };
        Ok(if counted == 1 {
            WindowAttempt::Counted(current)
        } else {
            WindowAttempt::Refused(current)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_millis_never_zero() {
        assert_eq!(ttl_millis(Duration::from_secs(120)), 120_000);
        assert_eq!(ttl_millis(Duration::from_micros(10)), 1);
        assert_eq!(ttl_millis(Duration::ZERO), 1);
    }

    #[test]
    fn test_scripts_are_loaded() {
        assert!(!COMPARE_AND_SET.get_hash().is_empty());
        assert_ne!(COMPARE_AND_SET.get_hash(), INCREMENT_WITH_TTL.get_hash());
        assert_ne!(CONSUME_WINDOW.get_hash(), COMPARE_AND_SET.get_hash());
    }
}
