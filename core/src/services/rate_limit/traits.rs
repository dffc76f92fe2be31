//! Rate limiting trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::domain::value_objects::Allowed;
use crate::errors::DomainResult;

/// Fixed-window attempt counter keyed by an arbitrary string
#[async_trait]
pub trait RateLimiterTrait: Send + Sync {
    /// Count one attempt against `key`, or fail with `AuthError::RateLimited`
    /// once `max_attempts` have been used inside the current window.
    async fn check_and_consume(
        &self,
        key: &str,
        max_attempts: u32,
        window: Duration,
    ) -> DomainResult<Allowed>;

    /// Attempts left in the active window (`max_attempts` when none is active)
    async fn remaining_attempts(&self, key: &str, max_attempts: u32, window: Duration) -> DomainResult<u32>;

    /// End of the active window (`now` when none is active)
    async fn reset_time(&self, key: &str, window: Duration) -> DomainResult<DateTime<Utc>>;
}
