//! Error taxonomy for the passcode lifecycle.
//!
//! Every failure surfaced to a caller is a typed kind, never a bare
//! string, so callers can branch without string matching. Only
//! `MaxAttemptsExceeded` carries actionable retry timing; all other
//! kinds are terminal for the current request.

use std::time::Duration;

use thiserror::Error;

/// Failures surfaced by the passcode lifecycle engine.
///
/// `UnknownOtp` deliberately covers both "never existed" and "expired"
/// so that verification responses leak no existence signal. Store
/// connectivity failures are kept distinct as `StoreUnavailable` rather
/// than folded into `UnknownOtp`, so an infrastructure outage cannot
/// masquerade as routine expiry.
#[derive(Error, Debug)]
pub enum OtpError {
    #[error("{provider} provider not supported")]
    ProviderNotSupported { provider: String },

    #[error("invalid `to` address: {message}")]
    InvalidAddress { message: String },

    #[error("TTL value cannot be empty")]
    MissingTtl,

    #[error("max attempts cannot be empty")]
    MissingMaxAttempts,

    #[error("{message}")]
    Validation { message: String },

    #[error("error generating id")]
    IdGenerationFailed,

    #[error("error generating passcode")]
    CodeGenerationFailed,

    #[error("passcode store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("too many attempts, retry after {} seconds", .retry_after.as_secs())]
    MaxAttemptsExceeded { retry_after: Duration },

    #[error("incorrect passcode")]
    InvalidOtp,

    #[error("error sending passcode via {provider}: {message}")]
    SendingOtpFailed { provider: String, message: String },

    #[error("error checking passcode")]
    UnknownOtp,
}

impl OtpError {
    /// Retry hint for lockouts; `None` for every other kind.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::MaxAttemptsExceeded { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

pub type OtpResult<T> = Result<T, OtpError>;
