//! Passcode lifecycle engine.

mod service;
mod types;

#[cfg(test)]
mod tests;

pub use service::OtpService;
pub use types::{CheckOtpStatusRequest, CreateOtpRequest, CreateOtpResponse, VerifyOtpRequest};
