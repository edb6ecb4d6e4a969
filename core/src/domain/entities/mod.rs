//! Entity definitions.

pub mod otp;

pub use otp::{Otp, ALPHANUMERIC_CHARS, ID_LENGTH, NUMERIC_CHARS};
