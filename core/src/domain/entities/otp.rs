//! One-time passcode entity.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Length of generated passcode ids
pub const ID_LENGTH: usize = 32;

/// Characters used for generated ids
pub const ALPHANUMERIC_CHARS: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Characters used for generated passcodes
pub const NUMERIC_CHARS: &[u8] = b"0123456789";

/// A one-time passcode record.
///
/// `(namespace, id)` is the primary key. The `attempts` counter is owned
/// by the store and is only ever advanced as part of an atomic
/// check-and-increment; the lifecycle engine never writes it directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Otp {
    /// Logical partition, e.g. "login" or "signup"
    pub namespace: String,

    /// Caller-supplied or generated identifier
    pub id: String,

    /// The secret passcode value
    pub code: String,

    /// Destination address; empty for passcodes that are not delivered
    pub to: String,

    /// Display string describing the delivery channel
    pub channel_description: String,

    /// Display string describing the destination address
    pub address_description: String,

    /// Name of the provider that delivers this passcode
    pub provider: String,

    /// Opaque caller metadata
    pub extra: Vec<u8>,

    /// Timestamp stamped by the store when the record was persisted
    pub created_at: DateTime<Utc>,

    /// Requested lifetime on `set`; remaining lifetime on `check`
    pub ttl: Duration,

    /// Total verification attempts allowed before the record locks
    pub max_attempts: u32,

    /// Attempts consumed so far; incremented only by the store
    pub attempts: u32,

    /// Terminal marker set after successful verification
    pub closed: bool,
}

impl Otp {
    /// A record is locked once its attempt budget is exhausted. Locked
    /// records reject every match regardless of code correctness.
    pub fn is_locked(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    /// Attempts left before the record locks.
    pub fn remaining_attempts(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempts)
    }
}

impl Default for Otp {
    fn default() -> Self {
        Self {
            namespace: String::new(),
            id: String::new(),
            code: String::new(),
            to: String::new(),
            channel_description: String::new(),
            address_description: String::new(),
            provider: String::new(),
            extra: b"{}".to_vec(),
            created_at: Utc::now(),
            ttl: Duration::ZERO,
            max_attempts: 0,
            attempts: 0,
            closed: false,
        }
    }
}
