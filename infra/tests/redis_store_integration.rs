//! Integration tests for the Redis-backed passcode store.

use std::sync::Arc;
use std::time::Duration;

use sesame_core::domain::entities::Otp;
use sesame_core::store::{OtpStore, StoreError};
use sesame_infra::{CacheConfig, RedisClient, RedisOtpStore};

async fn redis_store() -> RedisOtpStore {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let config = CacheConfig::new("redis://127.0.0.1:6379").with_prefix("sesame_test");
    let client = RedisClient::new(config)
        .await
        .expect("Failed to create Redis client");
    RedisOtpStore::new(client)
}

fn sample_otp(ttl: Duration, max_attempts: u32) -> Otp {
    Otp {
        code: "123456".to_string(),
        to: "user@example.com".to_string(),
        provider: "email".to_string(),
        ttl,
        max_attempts,
        ..Otp::default()
    }
}

#[tokio::test]
#[ignore] // Requires Redis to be running
async fn test_set_check_round_trip() {
    let store = redis_store().await;
    store.delete("it", "round-trip").await.unwrap();

    let stored = store
        .set("it", "round-trip", sample_otp(Duration::from_secs(60), 3))
        .await
        .unwrap();
    assert_eq!(stored.attempts, 0);
    assert!(!stored.closed);

    let read = store.check("it", "round-trip", false).await.unwrap();
    assert_eq!(read.code, "123456");
    assert_eq!(read.attempts, 0);
    assert!(read.ttl <= Duration::from_secs(60));
    assert!(read.ttl > Duration::from_secs(55));

    store.delete("it", "round-trip").await.unwrap();
}

#[tokio::test]
#[ignore] // Requires Redis to be running
async fn test_check_increments_atomically() {
    let store = Arc::new(redis_store().await);
    store.delete("it", "increments").await.unwrap();
    store
        .set("it", "increments", sample_otp(Duration::from_secs(60), 3))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..16 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store.check("it", "increments", true).await.unwrap().attempts
        }));
    }

    let mut seen = Vec::new();
    for handle in handles {
        seen.push(handle.await.unwrap());
    }
    seen.sort_unstable();
    let expected: Vec<u32> = (1..=16).collect();
    assert_eq!(seen, expected);

    store.delete("it", "increments").await.unwrap();
}

// Increments must not disturb the stored record JSON: an empty `extra`
// serializes as `[]`, which a naive re-encode of the document in the
// backend can turn into `{}` and poison every later read.
#[tokio::test]
#[ignore] // Requires Redis to be running
async fn test_empty_extra_survives_increments() {
    let store = redis_store().await;
    store.delete("it", "empty-extra").await.unwrap();

    let mut otp = sample_otp(Duration::from_secs(60), 3);
    otp.extra = Vec::new();
    store.set("it", "empty-extra", otp).await.unwrap();

    let first = store.check("it", "empty-extra", true).await.unwrap();
    assert_eq!(first.attempts, 1);
    assert!(first.extra.is_empty());

    let second = store.check("it", "empty-extra", true).await.unwrap();
    assert_eq!(second.attempts, 2);
    assert!(second.extra.is_empty());
    assert_eq!(second.code, "123456");

    store.delete("it", "empty-extra").await.unwrap();
}

#[tokio::test]
#[ignore] // Requires Redis to be running
async fn test_expired_key_is_absent() {
    let store = redis_store().await;
    store
        .set("it", "expires", sample_otp(Duration::from_millis(50), 3))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(150)).await;

    let err = store.check("it", "expires", true).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound));
}

#[tokio::test]
#[ignore] // Requires Redis to be running
async fn test_close_preserves_ttl_and_is_idempotent() {
    let store = redis_store().await;
    store.delete("it", "closes").await.unwrap();
    store
        .set("it", "closes", sample_otp(Duration::from_secs(60), 3))
        .await
        .unwrap();

    store.close("it", "closes").await.unwrap();
    store.close("it", "closes").await.unwrap();

    let read = store.check("it", "closes", false).await.unwrap();
    assert!(read.closed);
    assert!(read.ttl > Duration::from_secs(55));

    // Closing an absent key is a no-op.
    store.delete("it", "closes").await.unwrap();
    store.close("it", "closes").await.unwrap();
}

#[tokio::test]
#[ignore] // Requires Redis to be running
async fn test_delete_is_idempotent() {
    let store = redis_store().await;
    store
        .set("it", "deletes", sample_otp(Duration::from_secs(60), 3))
        .await
        .unwrap();

    store.delete("it", "deletes").await.unwrap();
    store.delete("it", "deletes").await.unwrap();

    let err = store.check("it", "deletes", false).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound));
}

#[tokio::test]
#[ignore] // Requires Redis to be running
async fn test_set_overwrites_and_resets_attempts() {
    let store = redis_store().await;
    store.delete("it", "overwrites").await.unwrap();
    store
        .set("it", "overwrites", sample_otp(Duration::from_secs(60), 3))
        .await
        .unwrap();
    store.check("it", "overwrites", true).await.unwrap();
    store.check("it", "overwrites", true).await.unwrap();

    let mut replacement = sample_otp(Duration::from_secs(60), 3);
    replacement.code = "654321".to_string();
    let stored = store.set("it", "overwrites", replacement).await.unwrap();
    assert_eq!(stored.attempts, 0);

    let read = store.check("it", "overwrites", false).await.unwrap();
    assert_eq!(read.code, "654321");
    assert_eq!(read.attempts, 0);

    store.delete("it", "overwrites").await.unwrap();
}
