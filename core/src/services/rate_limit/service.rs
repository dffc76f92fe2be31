//! Cache-backed fixed-window rate limiter

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::{RateLimitWindow, WindowAttempt};
use crate::domain::value_objects::Allowed;
use crate::errors::{AuthError, DomainError, DomainResult};
use crate::services::cache::CacheStore;
use crate::services::clock::Clock;

use super::traits::RateLimiterTrait;

/// Rate limiter keeping one [`RateLimitWindow`] per key in a [`CacheStore`]
///
/// Deciding and counting an attempt is a single store operation, so k
/// concurrent callers against a window with m attempts left admit exactly
/// min(k, m) of them, however their calls interleave.
pub struct FixedWindowRateLimiter<C: CacheStore> {
    cache: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<C: CacheStore> FixedWindowRateLimiter<C> {
    pub fn new(cache: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self { cache, clock }
    }

    /// Window stored under `key` if it is still running at `now`
    async fn active_window(
        &self,
        key: &str,
        now: DateTime<Utc>,
        window: ChronoDuration,
    ) -> DomainResult<Option<RateLimitWindow>> {
        let current = match self.cache.get(key).await? {
            Some(raw) => Some(serde_json::from_str::<RateLimitWindow>(&raw)?),
            None => None,
        };
        Ok(current.filter(|w| !w.is_elapsed(now, window)))
    }
}

fn to_chrono(window: Duration) -> DomainResult<ChronoDuration> {
    ChronoDuration::from_std(window).map_err(|e| DomainError::Internal {
        message: format!("rate limit window out of range: {}", e),
    })
}

#[async_trait]
impl<C: CacheStore> RateLimiterTrait for FixedWindowRateLimiter<C> {
    async fn check_and_consume(
        &self,
        key: &str,
        max_attempts: u32,
        window: Duration,
    ) -> DomainResult<Allowed> {
        let window_len = to_chrono(window)?;
        let now = self.clock.now();

        match self
            .cache
            .consume_window_attempt(key, now, window, max_attempts)
            .await?
        {
            WindowAttempt::Counted(next) => {
                let remaining = next.remaining(max_attempts);
                tracing::debug!(
                    key = key,
                    attempts = next.attempt_count,
                    remaining = remaining,
                    "Rate limit attempt recorded"
                );
                Ok(Allowed {
                    remaining,
                    reset_at: next.reset_at(window_len),
                })
            }
            WindowAttempt::Refused(current) => {
                let reset_at = current.reset_at(window_len);
                tracing::warn!(
                    key = key,
                    attempts = current.attempt_count,
                    max_attempts = max_attempts,
                    reset_at = %reset_at,
                    event = "rate_limit_exceeded",
                    "Rate limit exceeded"
                );
                Err(AuthError::RateLimited { reset_at }.into())
            }
        }
    }

    async fn remaining_attempts(&self, key: &str, max_attempts: u32, window: Duration) -> DomainResult<u32> {
        let now = self.clock.now();
        Ok(self
            .active_window(key, now, to_chrono(window)?)
            .await?
            .map_or(max_attempts, |w| w.remaining(max_attempts)))
    }

    async fn reset_time(&self, key: &str, window: Duration) -> DomainResult<DateTime<Utc>> {
        let now = self.clock.now();
        let window_len = to_chrono(window)?;
        Ok(self
            .active_window(key, now, window_len)
            .await?
            .map_or(now, |w| w.reset_at(window_len)))
    }
}
