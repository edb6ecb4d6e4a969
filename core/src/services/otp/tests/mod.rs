//! Tests for the passcode lifecycle engine.

mod mocks;
