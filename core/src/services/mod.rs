//! Business services.

pub mod otp;

pub use otp::{
    CheckOtpStatusRequest, CreateOtpRequest, CreateOtpResponse, OtpService, VerifyOtpRequest,
};
