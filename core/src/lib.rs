//! # Sesame Core
//!
//! Core domain layer for the Sesame passcode service. This crate contains
//! the OTP entity, the passcode lifecycle engine, the delivery-provider
//! registry with its message templates, the store contract, and the error
//! types shared by every layer above.

pub mod domain;
pub mod errors;
pub mod providers;
pub mod services;
pub mod store;

// Re-export commonly used types for convenience
pub use domain::entities::Otp;
pub use errors::{OtpError, OtpResult};
pub use providers::{
    ChannelProvider, ProviderRegistry, ProviderTemplates, PushData, RegisteredProvider,
    RegistryError, Template, TemplateError,
};
pub use services::{
    CheckOtpStatusRequest, CreateOtpRequest, CreateOtpResponse, OtpService, VerifyOtpRequest,
};
pub use store::{MemoryStore, OtpStore, StoreError, StoreResult};
