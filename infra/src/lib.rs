//! # Infrastructure Layer
//!
//! Concrete implementations of the contracts `sesame_core` consumes.
//! Currently this is the Redis-backed passcode store and its connection
//! plumbing; the in-memory reference store lives in `sesame_core` next
//! to the contract it illustrates.

pub mod cache;
pub mod config;

pub use cache::{RedisClient, RedisOtpStore};
pub use config::CacheConfig;

use thiserror::Error;

/// Infrastructure-level failures.
#[derive(Error, Debug)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Record (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation exceeded its deadline
    #[error("Timeout: {0}")]
    Timeout(String),
}
