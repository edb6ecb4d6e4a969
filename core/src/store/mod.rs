//! Store contract for passcode persistence.
//!
//! The lifecycle engine owns no cross-request state; every concurrency
//! guarantee in the system reduces to the store's atomic
//! check-and-increment. Implementations back this with whatever
//! primitive the persistence technology offers (a Lua script on Redis,
//! a single mutex for the in-memory reference store).

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::Otp;

/// Failures a store implementation can report.
///
/// `NotFound` is the sentinel for an absent or TTL-expired key; every
/// other failure is an infrastructure problem and must be reported as
/// `Backend`, never conflated with absence.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("otp does not exist")]
    NotFound,

    #[error("store backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence contract for passcode records, keyed by `(namespace, id)`.
#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Create or overwrite the record for the key, seeding `attempts = 0`
    /// and `closed = false`, stamping `created_at` and scheduling expiry
    /// after `otp.ttl`. Latest write wins; returns the stored record.
    async fn set(&self, namespace: &str, id: &str, otp: Otp) -> StoreResult<Otp>;

    /// Read the current record, with `ttl` rewritten to the remaining
    /// lifetime. When `increment` is set, the attempt counter must be
    /// advanced atomically with the read so concurrent verifications
    /// never lose an update. Absent or expired keys are `NotFound`.
    async fn check(&self, namespace: &str, id: &str, increment: bool) -> StoreResult<Otp>;

    /// Mark the record closed. Idempotent; an absent key is a no-op.
    async fn close(&self, namespace: &str, id: &str) -> StoreResult<()>;

    /// Remove the record. Idempotent; an absent key is a no-op.
    async fn delete(&self, namespace: &str, id: &str) -> StoreResult<()>;
}
