//! Integration tests for the public rate limiting API using the in-memory
//! store.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use regguard::{GuardConfig, InMemoryStore, Limit, RateLimitStore, RateLimiter};

#[tokio::test]
async fn first_hit_on_fresh_key_counts_one() {
    let store = InMemoryStore::new();

    let info = store.increment("login:10.0.0.1", 60).await.unwrap();
    assert_eq!(info.hits, 1);
}

#[tokio::test]
async fn nth_hit_within_window_counts_n() {
    let store = InMemoryStore::new();

    for n in 1..=10u32 {
        let info = store.increment("login:10.0.0.1", 60).await.unwrap();
        assert_eq!(info.hits, n);
    }
}

#[tokio::test]
async fn count_restarts_after_window_elapses() {
    let store = InMemoryStore::new();

    // Fill up a one-second window
    for _ in 0..4 {
        store.increment("login:10.0.0.1", 1).await.unwrap();
    }

    tokio::time::sleep(StdDuration::from_millis(1100)).await;

    let info = store.increment("login:10.0.0.1", 1).await.unwrap();
    assert_eq!(info.hits, 1);
}

#[tokio::test]
async fn keys_do_not_interfere() {
    let store = InMemoryStore::new();

    for _ in 0..5 {
        store.increment("login:10.0.0.1", 60).await.unwrap();
    }
    let info = store.increment("login:10.0.0.2", 60).await.unwrap();
    assert_eq!(info.hits, 1);

    // Same client, different action is also a separate counter
    let info = store.increment("signup:10.0.0.1", 60).await.unwrap();
    assert_eq!(info.hits, 1);
}

#[tokio::test]
async fn concurrent_increments_lose_no_updates() {
    let store = Arc::new(InMemoryStore::new());

    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            for _ in 0..25 {
                store.increment("login:10.0.0.1", 600).await.unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let info = store.get("login:10.0.0.1").await.unwrap().unwrap();
    assert_eq!(info.hits, 200);
}

#[tokio::test]
async fn login_ceiling_rejects_sixth_attempt() {
    let config = GuardConfig::default();
    let limiter = config.limiter(Arc::new(InMemoryStore::new()));

    for _ in 0..5 {
        let result = limiter.hit("login", "10.0.0.1").await.unwrap();
        assert!(result.is_allowed());
    }

    let result = limiter.hit("login", "10.0.0.1").await.unwrap();
    assert!(result.is_limited());
    assert!(result.retry_after().unwrap() <= 60);
}

#[tokio::test]
async fn signup_ceiling_rejects_fourth_attempt() {
    let config = GuardConfig::default();
    let limiter = config.limiter(Arc::new(InMemoryStore::new()));

    for _ in 0..3 {
        assert!(limiter.hit("signup", "10.0.0.1").await.unwrap().is_allowed());
    }
    assert!(limiter.hit("signup", "10.0.0.1").await.unwrap().is_limited());
}

#[tokio::test]
async fn check_rate_composes_increment_and_ceiling() {
    let limiter = RateLimiter::new(Arc::new(InMemoryStore::new()));

    for _ in 0..3 {
        assert!(
            limiter
                .check_rate("10.0.0.1", "signup", Duration::minutes(1), 3)
                .await
        );
    }
    assert!(
        !limiter
            .check_rate("10.0.0.1", "signup", Duration::minutes(1), 3)
            .await
    );

    // Another client is unaffected
    assert!(
        limiter
            .check_rate("10.0.0.2", "signup", Duration::minutes(1), 3)
            .await
    );
}

#[tokio::test]
async fn limited_result_carries_custom_message() {
    let limiter = RateLimiter::new(Arc::new(InMemoryStore::new())).for_(
        "login",
        Limit::per_minute(1).message("Too many login attempts. Please try again later."),
    );

    limiter.hit("login", "10.0.0.1").await.unwrap();
    let result = limiter.hit("login", "10.0.0.1").await.unwrap();

    match result {
        regguard::RateLimitResult::Limited { message, .. } => {
            assert_eq!(message, "Too many login attempts. Please try again later.");
        }
        regguard::RateLimitResult::Allowed { .. } => panic!("expected limited"),
    }
}

#[tokio::test]
async fn cleanup_drops_only_expired_records() {
    let store = InMemoryStore::new();

    store.increment("login:10.0.0.1", 1).await.unwrap();
    store.increment("signup:10.0.0.2", 600).await.unwrap();

    tokio::time::sleep(StdDuration::from_millis(1100)).await;
    store.cleanup_expired();

    assert!(store.get("login:10.0.0.1").await.unwrap().is_none());
    assert!(store.get("signup:10.0.0.2").await.unwrap().is_some());
}
