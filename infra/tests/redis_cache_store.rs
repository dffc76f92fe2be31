//! Integration tests for the Redis cache store
//!
//! These require a running Redis; run with `cargo test -- --ignored` and
//! `REDIS_URL` pointing at a disposable instance.

use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

use otp_core::domain::entities::{RateLimitWindow, WindowAttempt};
use otp_core::errors::{AuthError, DomainError};
use otp_core::services::cache::{CacheEntry, CacheStore, CasTtl};
use otp_core::services::clock::SystemClock;
use otp_core::services::otp::{OtpManager, OtpProvider, OtpServiceConfig};
use otp_core::services::rate_limit::{FixedWindowRateLimiter, RateLimiterTrait};
use otp_infra::cache::{CacheConfig, RedisCacheStore, RedisClient};

async fn store() -> RedisCacheStore {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
    let prefix = format!("otp-test-{}:", rand::thread_rng().gen::<u32>());
    let client = RedisClient::new(CacheConfig::new(url).with_key_prefix(prefix))
        .await
        .expect("Redis must be reachable for ignored tests");
    client.ping().await.unwrap();
    RedisCacheStore::new(client)
}

#[tokio::test]
#[ignore] // Requires actual Redis
async fn test_get_set_and_expiry() {
    let store = store().await;

    store.set_with_ttl("k", "v", Duration::from_millis(300)).await.unwrap();
    assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(store.get("k").await.unwrap(), None);
}

#[tokio::test]
#[ignore] // Requires actual Redis
async fn test_compare_and_set_semantics() {
    let store = store().await;
    let ttl = CasTtl::Reset(Duration::from_secs(30));

    assert!(store.compare_and_set("cas", None, "a", ttl).await.unwrap());
    assert!(!store.compare_and_set("cas", None, "b", ttl).await.unwrap());
    assert!(!store.compare_and_set("cas", Some("x"), "b", ttl).await.unwrap());
    assert!(store.compare_and_set("cas", Some("a"), "b", CasTtl::Keep).await.unwrap());
    assert_eq!(store.get("cas").await.unwrap(), Some("b".to_string()));

    let pttl: i64 = {
        let key = store.client().key("cas");
        store
            .client()
            .execute_idempotent("PTTL", move |mut conn| {
                let key = key.clone();
                Box::pin(async move { redis::cmd("PTTL").arg(key).query_async::<_, i64>(&mut conn).await })
            })
            .await
            .unwrap()
    };
    assert!(pttl > 0 && pttl <= 30_000);
}

#[tokio::test]
#[ignore] // Requires actual Redis
async fn test_increment_sets_ttl_on_create_only() {
    let store = store().await;

    assert_eq!(store.increment_with_ttl("n", Duration::from_secs(30)).await.unwrap(), 1);
    assert_eq!(store.increment_with_ttl("n", Duration::from_secs(1)).await.unwrap(), 2);

    tokio::time::sleep(Duration::from_millis(1200)).await;
    assert_eq!(store.get("n").await.unwrap(), Some("2".to_string()));
}

#[tokio::test]
#[ignore] // Requires actual Redis
async fn test_transactional_set_writes_all() {
    let store = store().await;
    let batch = vec![
        CacheEntry::new("a", "1", Duration::from_secs(30)),
        CacheEntry::new("b", "2", Duration::from_secs(30)),
    ];

    store.transactional_set(&batch).await.unwrap();
    assert_eq!(store.get("a").await.unwrap(), Some("1".to_string()));
    assert_eq!(store.get("b").await.unwrap(), Some("2".to_string()));
}

#[tokio::test]
#[ignore] // Requires actual Redis
async fn test_concurrent_validation_consumes_once() {
    let store = Arc::new(store().await);
    let manager = Arc::new(OtpManager::new(store, Arc::new(SystemClock), OtpServiceConfig::default()));
    manager.issue_challenge("09111112222", "123456").await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..10 {
        let manager = manager.clone();
        handles.push(tokio::spawn(async move {
            manager.validate_challenge("09111112222", "123456").await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => successes += 1,
            Err(e) => assert_eq!(e, DomainError::Auth(AuthError::OtpAlreadyUsed)),
        }
    }
    assert_eq!(successes, 1);
}

#[tokio::test]
#[ignore] // Requires actual Redis
async fn test_concurrent_rate_limit_admits_max() {
    let store = Arc::new(store().await);
    let limiter = Arc::new(FixedWindowRateLimiter::new(store, Arc::new(SystemClock)));

    let mut handles = Vec::new();
    for _ in 0..12 {
        let limiter = limiter.clone();
        handles.push(tokio::spawn(async move {
            limiter
                .check_and_consume("rate_limit:otp-send:09111112222", 3, Duration::from_secs(60))
                .await
        }));
    }

    let mut admitted = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            admitted += 1;
        }
    }
    assert_eq!(admitted, 3);
}

#[tokio::test]
#[ignore] // Requires actual Redis
async fn test_window_attempt_script() {
    let store = store().await;
    let window = Duration::from_secs(60);
    let start = chrono::Utc::now();

    let first = store.consume_window_attempt("w", start, window, 2).await.unwrap();
    assert_eq!(first, WindowAttempt::Counted(RateLimitWindow::start(start)));

    let later = start + chrono::Duration::seconds(10);
    let second = store.consume_window_attempt("w", later, window, 2).await.unwrap();
    assert_eq!(second.window().attempt_count, 2);
    assert_eq!(second.window().window_start_ms, start.timestamp_millis());
    assert!(matches!(
        store.consume_window_attempt("w", later, window, 2).await.unwrap(),
        WindowAttempt::Refused(w) if w.attempt_count == 2
    ));

    // The stored value stays readable by the limiter's own decoder
    let raw = store.get("w").await.unwrap().unwrap();
    let stored: RateLimitWindow = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored, second.window());

    let elapsed = start + chrono::Duration::seconds(60);
    let reopened = store.consume_window_attempt("w", elapsed, window, 2).await.unwrap();
    assert_eq!(reopened, WindowAttempt::Counted(RateLimitWindow::start(elapsed)));

    store.set_with_ttl("foreign", "{}", window).await.unwrap();
    let err = store.consume_window_attempt("foreign", start, window, 2).await.unwrap_err();
    assert!(err.is_infrastructure());
}

#[tokio::test]
#[ignore] // Requires actual Redis
async fn test_contended_rate_limit_with_large_max() {
    let store = Arc::new(store().await);
    let limiter = Arc::new(FixedWindowRateLimiter::new(store, Arc::new(SystemClock)));

    let mut handles = Vec::new();
    for _ in 0..120 {
        let limiter = limiter.clone();
        handles.push(tokio::spawn(async move {
            limiter
                .check_and_consume("rate_limit:otp-verify:09111112222", 100, Duration::from_secs(60))
                .await
        }));
    }

    let mut admitted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => admitted += 1,
            Err(e) => assert!(matches!(e, DomainError::Auth(AuthError::RateLimited { .. }))),
        }
    }
    assert_eq!(admitted, 100);
}
