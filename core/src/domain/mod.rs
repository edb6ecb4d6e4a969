//! Domain entities for the passcode service.

pub mod entities;

pub use entities::*;
