//! Redis-backed implementation of the passcode store contract.
//!
//! Each record lives in a single Redis hash under `otp:{namespace}:{id}`
//! with three fields: the `record` JSON written once at `set`, the
//! `attempts` counter and the `closed` flag. The record JSON is never
//! re-encoded after it is written — cjson does not round-trip every
//! serde document (an empty JSON array comes back as `{}`) — so the
//! mutable state is kept in plain hash fields instead and `attempts`
//! advances with `HINCRBY` inside a Lua script, keeping the read and
//! the increment in one atomic step. The TTL sits on the hash key
//! itself: expiry removes the whole record and an expired key is
//! simply absent.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use redis::Script;
use tracing::debug;

use sesame_core::domain::entities::Otp;
use sesame_core::store::{OtpStore, StoreError, StoreResult};

use crate::cache::RedisClient;
use crate::InfrastructureError;

/// Atomic create-or-overwrite with fresh counters and a new expiry.
/// KEYS[1] = record key, ARGV[1] = record JSON, ARGV[2] = TTL in ms.
const SET_SCRIPT: &str = r#"
redis.call('DEL', KEYS[1])
redis.call('HSET', KEYS[1], 'record', ARGV[1], 'attempts', 0, 'closed', 0)
redis.call('PEXPIRE', KEYS[1], ARGV[2])
return 1
"#;

/// Atomic read, optional attempts increment, and remaining-TTL report.
/// KEYS[1] = record key, ARGV[1] = "1" to increment.
const CHECK_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 0 then
  return nil
end
if ARGV[1] == '1' then
  redis.call('HINCRBY', KEYS[1], 'attempts', 1)
end
local fields = redis.call('HMGET', KEYS[1], 'record', 'attempts', 'closed')
local ttl = redis.call('PTTL', KEYS[1])
return {fields[1], fields[2], fields[3], ttl}
"#;

/// Set the closed flag without touching the record or its TTL. Absent
/// key is a no-op.
const CLOSE_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 0 then
  return 0
end
redis.call('HSET', KEYS[1], 'closed', 1)
return 1
"#;

/// Redis-backed passcode store.
pub struct RedisOtpStore {
    client: RedisClient,
}

impl RedisOtpStore {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    fn key(&self, namespace: &str, id: &str) -> String {
        self.client.make_key(&format!("otp:{}:{}", namespace, id))
    }
}

fn backend(e: impl Into<InfrastructureError>) -> StoreError {
    StoreError::Backend(e.into().to_string())
}

#[async_trait]
impl OtpStore for RedisOtpStore {
    async fn set(&self, namespace: &str, id: &str, otp: Otp) -> StoreResult<Otp> {
        let stored = Otp {
            namespace: namespace.to_string(),
            id: id.to_string(),
            attempts: 0,
            closed: false,
            created_at: Utc::now(),
            ..otp
        };

        let payload = serde_json::to_string(&stored).map_err(backend)?;
        let expiry_ms = (stored.ttl.as_millis() as u64).max(1);

        let mut conn = self.client.connection();
        let _: i64 = Script::new(SET_SCRIPT)
            .key(self.key(namespace, id))
            .arg(payload)
            .arg(expiry_ms)
            .invoke_async(&mut conn)
            .await
            .map_err(backend)?;

        debug!(
            namespace = namespace,
            expiry_ms = expiry_ms,
            "stored passcode record"
        );
        Ok(stored)
    }

    async fn check(&self, namespace: &str, id: &str, increment: bool) -> StoreResult<Otp> {
        let mut conn = self.client.connection();
        let reply: Option<(String, String, String, i64)> = Script::new(CHECK_SCRIPT)
            .key(self.key(namespace, id))
            .arg(if increment { 1 } else { 0 })
            .invoke_async(&mut conn)
            .await
            .map_err(backend)?;

        let (raw, attempts, closed, pttl_ms) = reply.ok_or(StoreError::NotFound)?;

        // The hash fields supersede the counters baked into the JSON.
        let mut otp: Otp = serde_json::from_str(&raw).map_err(backend)?;
        otp.attempts = attempts
            .parse()
            .map_err(|e| StoreError::Backend(format!("bad attempts counter: {}", e)))?;
        otp.closed = closed == "1";
        otp.ttl = if pttl_ms > 0 {
            Duration::from_millis(pttl_ms as u64)
        } else {
            Duration::ZERO
        };
        Ok(otp)
    }

    async fn close(&self, namespace: &str, id: &str) -> StoreResult<()> {
        let mut conn = self.client.connection();
        let _: i64 = Script::new(CLOSE_SCRIPT)
            .key(self.key(namespace, id))
            .invoke_async(&mut conn)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn delete(&self, namespace: &str, id: &str) -> StoreResult<()> {
        let mut conn = self.client.connection();
        redis::cmd("DEL")
            .arg(self.key(namespace, id))
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(backend)?;
        Ok(())
    }
}
