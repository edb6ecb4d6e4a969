//! Mock implementations for testing the lifecycle engine.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::entities::Otp;
use crate::providers::ChannelProvider;
use crate::store::{OtpStore, StoreError, StoreResult};

/// Recorded delivery from the mock provider.
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

// Mock email provider for testing
pub struct MockEmailProvider {
    pub sent: Arc<Mutex<Vec<SentMessage>>>,
    pub should_fail: bool,
}

impl MockEmailProvider {
    pub fn new(should_fail: bool) -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            should_fail,
        }
    }

    pub fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChannelProvider for MockEmailProvider {
    fn id(&self) -> &str {
        "email"
    }

    fn channel_name(&self) -> &str {
        "Email"
    }

    fn validate_address(&self, to: &str) -> Result<(), String> {
        if to.contains('@') {
            Ok(())
        } else {
            Err(format!("not an email address: {}", to))
        }
    }

    fn max_code_length(&self) -> usize {
        6
    }

    async fn push(&self, otp: &Otp, subject: &str, body: &str) -> Result<(), String> {
        if self.should_fail {
            return Err("smtp transport error".to_string());
        }
        self.sent.lock().unwrap().push(SentMessage {
            to: otp.to.clone(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

// Store that fails every call, for exercising the infrastructure
// error path.
pub struct FailingStore;

#[async_trait]
impl OtpStore for FailingStore {
    async fn set(&self, _namespace: &str, _id: &str, _otp: Otp) -> StoreResult<Otp> {
        Err(StoreError::Backend("connection refused".to_string()))
    }

    async fn check(&self, _namespace: &str, _id: &str, _increment: bool) -> StoreResult<Otp> {
        Err(StoreError::Backend("connection refused".to_string()))
    }

    async fn close(&self, _namespace: &str, _id: &str) -> StoreResult<()> {
        Err(StoreError::Backend("connection refused".to_string()))
    }

    async fn delete(&self, _namespace: &str, _id: &str) -> StoreResult<()> {
        Err(StoreError::Backend("connection refused".to_string()))
    }
}
