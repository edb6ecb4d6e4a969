//! Request and response types for the passcode lifecycle engine.

use std::time::Duration;

use serde::Serialize;

use crate::domain::entities::Otp;

/// Request to issue (or reissue) a passcode.
#[derive(Debug, Clone, Default)]
pub struct CreateOtpRequest {
    /// Base URL the service is reachable at, used to build view and
    /// check URLs embedded in messages
    pub root_url: String,

    /// Logical partition for the key
    pub namespace: String,

    /// Display noun for the code ("OTP", "passcode", ...), available to
    /// templates as `code_type`
    pub code_type: String,

    /// Name of the delivery channel to resolve
    pub provider: String,

    /// Caller-supplied id; generated when empty
    pub id: String,

    /// Destination address; empty for pre-shared codes that are never
    /// delivered
    pub to: String,

    /// Display string describing the channel
    pub channel_description: String,

    /// Display string describing the address
    pub address_description: String,

    /// Opaque caller metadata; defaults to `{}` when absent
    pub extra: Option<Vec<u8>>,

    /// Record lifetime; mandatory
    pub ttl: Duration,

    /// Attempt budget; mandatory, at least 1
    pub max_attempts: u32,

    /// Whether to push the rendered message through the provider
    pub deliver: bool,
}

/// Issued passcode plus the caller-facing view URL and the rendered
/// message parts, so the caller can preview or resend through another
/// channel.
#[derive(Debug, Clone, Serialize)]
pub struct CreateOtpResponse {
    #[serde(flatten)]
    pub otp: Otp,
    pub url: String,
    pub subject: String,
    pub body: String,
}

/// Request to verify a candidate passcode. Consumes one attempt.
#[derive(Debug, Clone, Default)]
pub struct VerifyOtpRequest {
    pub namespace: String,
    pub provider: String,
    pub id: String,
    pub code: String,
}

/// Request to probe a passcode's state without consuming an attempt.
#[derive(Debug, Clone, Default)]
pub struct CheckOtpStatusRequest {
    pub namespace: String,
    pub provider: String,
    pub id: String,
}
