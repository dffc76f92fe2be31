//! Tests for the fixed-window rate limiter

use chrono::Duration as ChronoDuration;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

use crate::errors::{AuthError, DomainError};
use crate::services::cache::tests::mocks::{FailingCacheStore, LaggyCacheStore};
use crate::services::cache::{CacheStore, InMemoryCacheStore};
use crate::services::clock::{Clock, ManualClock};
use crate::services::rate_limit::{FixedWindowRateLimiter, RateLimiterTrait};

const KEY: &str = "rate_limit:otp-send:09111112222";
const TEN_MINUTES: Duration = Duration::from_secs(600);

fn limiter() -> (Arc<FixedWindowRateLimiter<InMemoryCacheStore>>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::starting_now());
    let cache = Arc::new(InMemoryCacheStore::with_clock(clock.clone()));
    (Arc::new(FixedWindowRateLimiter::new(cache, clock.clone())), clock)
}

#[tokio::test]
async fn test_fourth_attempt_in_window_is_limited() {
    let (limiter, clock) = limiter();
    let start = clock.now();

    for expected_remaining in [2, 1, 0] {
        let allowed = limiter.check_and_consume(KEY, 3, TEN_MINUTES).await.unwrap();
        assert_eq!(allowed.remaining, expected_remaining);
        assert_eq!(allowed.reset_at, start + ChronoDuration::minutes(10));
    }

    let err = limiter.check_and_consume(KEY, 3, TEN_MINUTES).await.unwrap_err();
    match err {
        DomainError::Auth(AuthError::RateLimited { reset_at }) => {
            assert_eq!(reset_at, start + ChronoDuration::minutes(10));
        }
        other => panic!("expected rate limit, got {:?}", other),
    }
}

#[tokio::test]
async fn test_limited_attempts_are_not_counted() {
    let (limiter, _) = limiter();
    for _ in 0..3 {
        limiter.check_and_consume(KEY, 3, TEN_MINUTES).await.unwrap();
    }
    for _ in 0..5 {
        assert!(limiter.check_and_consume(KEY, 3, TEN_MINUTES).await.is_err());
    }
    assert_eq!(limiter.remaining_attempts(KEY, 3, TEN_MINUTES).await.unwrap(), 0);
}

#[tokio::test]
async fn test_new_window_after_expiry_resets_count() {
    let (limiter, clock) = limiter();
    for _ in 0..3 {
        limiter.check_and_consume(KEY, 3, TEN_MINUTES).await.unwrap();
    }
    assert!(limiter.check_and_consume(KEY, 3, TEN_MINUTES).await.is_err());

    clock.advance(ChronoDuration::minutes(10) + ChronoDuration::seconds(1));
    let allowed = limiter.check_and_consume(KEY, 3, TEN_MINUTES).await.unwrap();
    assert_eq!(allowed.remaining, 2);
    assert_eq!(allowed.reset_at, clock.now() + ChronoDuration::minutes(10));
}

#[tokio::test]
async fn test_window_boundary_is_inclusive() {
    let (limiter, clock) = limiter();
    for _ in 0..3 {
        limiter.check_and_consume(KEY, 3, TEN_MINUTES).await.unwrap();
    }

    clock.advance(ChronoDuration::minutes(10) - ChronoDuration::seconds(1));
    assert!(limiter.check_and_consume(KEY, 3, TEN_MINUTES).await.is_err());

    clock.advance(ChronoDuration::seconds(1));
    assert!(limiter.check_and_consume(KEY, 3, TEN_MINUTES).await.is_ok());
}

#[tokio::test]
async fn test_remaining_and_reset_without_window() {
    let (limiter, clock) = limiter();
    assert_eq!(limiter.remaining_attempts(KEY, 3, TEN_MINUTES).await.unwrap(), 3);
    assert_eq!(limiter.reset_time(KEY, TEN_MINUTES).await.unwrap(), clock.now());
}

#[tokio::test]
async fn test_remaining_and_reset_with_active_window() {
    let (limiter, clock) = limiter();
    let start = clock.now();
    limiter.check_and_consume(KEY, 3, TEN_MINUTES).await.unwrap();

    clock.advance(ChronoDuration::minutes(3));
    assert_eq!(limiter.remaining_attempts(KEY, 3, TEN_MINUTES).await.unwrap(), 2);
    assert_eq!(
        limiter.reset_time(KEY, TEN_MINUTES).await.unwrap(),
        start + ChronoDuration::minutes(10)
    );

    // A smaller max than the recorded count never underflows
    limiter.check_and_consume(KEY, 3, TEN_MINUTES).await.unwrap();
    assert_eq!(limiter.remaining_attempts(KEY, 1, TEN_MINUTES).await.unwrap(), 0);
}

#[tokio::test]
async fn test_keys_are_independent() {
    let (limiter, _) = limiter();
    for _ in 0..3 {
        limiter.check_and_consume(KEY, 3, TEN_MINUTES).await.unwrap();
    }
    assert!(limiter
        .check_and_consume("rate_limit:otp-verify:09111112222", 3, TEN_MINUTES)
        .await
        .is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_attempts_admit_exactly_max() {
    for (tasks_count, max_attempts) in [(20usize, 5u32), (3, 5), (5, 5), (12, 1)] {
        let (limiter, _) = limiter();
        let mut tasks = JoinSet::new();
        for _ in 0..tasks_count {
            let limiter = limiter.clone();
            tasks.spawn(async move { limiter.check_and_consume(KEY, max_attempts, TEN_MINUTES).await });
        }

        let mut admitted = 0;
        while let Some(result) = tasks.join_next().await {
            match result.unwrap() {
                Ok(_) => admitted += 1,
                Err(DomainError::Auth(AuthError::RateLimited { .. })) => {}
                Err(other) => panic!("unexpected error {:?}", other),
            }
        }
        assert_eq!(admitted, tasks_count.min(max_attempts as usize));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_contended_window_with_large_max_never_refuses_early() {
    for (tasks_count, max_attempts) in [(100usize, 100u32), (100, 40), (64, 33)] {
        let clock = Arc::new(ManualClock::starting_now());
        let cache = LaggyCacheStore::new(
            InMemoryCacheStore::with_clock(clock.clone()),
            Duration::from_millis(2),
        );
        let limiter = Arc::new(FixedWindowRateLimiter::new(Arc::new(cache), clock));

        let mut tasks = JoinSet::new();
        for _ in 0..tasks_count {
            let limiter = limiter.clone();
            tasks.spawn(async move { limiter.check_and_consume(KEY, max_attempts, TEN_MINUTES).await });
        }

        let mut admitted = 0;
        let mut limited = 0;
        while let Some(result) = tasks.join_next().await {
            match result.unwrap() {
                Ok(_) => admitted += 1,
                Err(DomainError::Auth(AuthError::RateLimited { .. })) => limited += 1,
                Err(other) => panic!("unexpected error {:?}", other),
            }
        }
        assert_eq!(admitted, tasks_count.min(max_attempts as usize));
        assert_eq!(admitted + limited, tasks_count);
        assert_eq!(
            limiter.remaining_attempts(KEY, max_attempts, TEN_MINUTES).await.unwrap(),
            max_attempts.saturating_sub(tasks_count as u32)
        );
    }
}

#[tokio::test]
async fn test_cache_outage_is_not_a_rate_limit_decision() {
    let cache = Arc::new(FailingCacheStore::default());
    let limiter = FixedWindowRateLimiter::new(cache, Arc::new(ManualClock::starting_now()));

    let err = limiter.check_and_consume(KEY, 3, TEN_MINUTES).await.unwrap_err();
    assert!(err.is_infrastructure());
    assert!(limiter.remaining_attempts(KEY, 3, TEN_MINUTES).await.unwrap_err().is_infrastructure());
}

#[tokio::test]
async fn test_corrupted_window_is_infrastructure_error() {
    let clock = Arc::new(ManualClock::starting_now());
    let cache = Arc::new(InMemoryCacheStore::with_clock(clock.clone()));
    cache.set_with_ttl(KEY, "garbage", TEN_MINUTES).await.unwrap();
    let limiter = FixedWindowRateLimiter::new(cache, clock);

    let err = limiter.check_and_consume(KEY, 3, TEN_MINUTES).await.unwrap_err();
    assert!(err.is_infrastructure());
}
