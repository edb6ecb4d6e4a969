//! In-memory reference implementation of the store contract.
//!
//! Intended for tests and development setups. A single mutex guards the
//! whole map, which makes `check(increment = true)` naturally atomic —
//! the in-process equivalent of the Lua script the Redis store uses.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::entities::Otp;
use crate::store::{OtpStore, StoreError, StoreResult};

struct Entry {
    otp: Otp,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    fn remaining_ttl(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }
}

/// In-memory passcode store with per-key TTL expiry.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<(String, String), Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(namespace: &str, id: &str) -> (String, String) {
        (namespace.to_string(), id.to_string())
    }
}

#[async_trait]
impl OtpStore for MemoryStore {
    async fn set(&self, namespace: &str, id: &str, otp: Otp) -> StoreResult<Otp> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let stored = Otp {
            namespace: namespace.to_string(),
            id: id.to_string(),
            attempts: 0,
            closed: false,
            created_at: Utc::now(),
            ..otp
        };

        entries.insert(
            Self::key(namespace, id),
            Entry {
                otp: stored.clone(),
                expires_at: Instant::now() + stored.ttl,
            },
        );

        Ok(stored)
    }

    async fn check(&self, namespace: &str, id: &str, increment: bool) -> StoreResult<Otp> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let key = Self::key(namespace, id);
        let now = Instant::now();

        // Expired entries are indistinguishable from absent ones.
        if entries.get(&key).is_some_and(|e| e.is_expired(now)) {
            entries.remove(&key);
        }

        let entry = entries.get_mut(&key).ok_or(StoreError::NotFound)?;
        if increment {
            entry.otp.attempts += 1;
        }

        let mut out = entry.otp.clone();
        out.ttl = entry.remaining_ttl(now);
        Ok(out)
    }

    async fn close(&self, namespace: &str, id: &str) -> StoreResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        if let Some(entry) = entries.get_mut(&Self::key(namespace, id)) {
            entry.otp.closed = true;
        }
        Ok(())
    }

    async fn delete(&self, namespace: &str, id: &str) -> StoreResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        entries.remove(&Self::key(namespace, id));
        Ok(())
    }
}
