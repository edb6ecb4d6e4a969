//! Delivery-channel providers and their message templates.

pub mod registry;
pub mod template;

pub use registry::{ProviderRegistry, RegisteredProvider, RegistryError};
pub use template::{ProviderTemplates, PushData, Template, TemplateError};

use async_trait::async_trait;

use crate::domain::entities::Otp;

/// Contract a delivery channel must satisfy.
///
/// Implementations are constructed once at startup and registered under
/// their `id()`; the engine resolves them by exact name match per
/// request. Address validation runs before any passcode is generated so
/// an unreachable destination never consumes a code or an attempt slot.
#[async_trait]
pub trait ChannelProvider: Send + Sync {
    /// Registry key, e.g. "smtp".
    fn id(&self) -> &str;

    /// Human-readable channel label used in rendered messages.
    fn channel_name(&self) -> &str;

    /// Check that `to` is a deliverable address for this channel.
    fn validate_address(&self, to: &str) -> Result<(), String>;

    /// Upper bound on generated passcode length for this channel.
    fn max_code_length(&self) -> usize;

    /// Deliver the rendered message. A transport failure is reported to
    /// the caller but never rolls back the persisted record.
    async fn push(&self, otp: &Otp, subject: &str, body: &str) -> Result<(), String>;
}
