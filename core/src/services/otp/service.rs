//! Passcode lifecycle engine implementation.

use std::sync::Arc;

use constant_time_eq::constant_time_eq;
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::{debug, error, warn};

use crate::domain::entities::{Otp, ALPHANUMERIC_CHARS, ID_LENGTH, NUMERIC_CHARS};
use crate::errors::{OtpError, OtpResult};
use crate::providers::{ProviderRegistry, PushData, RegisteredProvider};
use crate::store::{OtpStore, StoreError};

use super::types::{
    CheckOtpStatusRequest, CreateOtpRequest, CreateOtpResponse, VerifyOtpRequest,
};

/// Minimum accepted id length on verification and status checks
pub const MIN_ID_LENGTH: usize = 6;

/// The passcode state machine: create, verify, check status.
///
/// Holds no mutable state of its own; all cross-request coordination is
/// delegated to the store's atomic check-and-increment, so the service
/// is safe to share across concurrent requests for the same key.
pub struct OtpService<S: OtpStore> {
    store: Arc<S>,
    registry: Arc<ProviderRegistry>,
}

impl<S: OtpStore> OtpService<S> {
    pub fn new(store: Arc<S>, registry: Arc<ProviderRegistry>) -> Self {
        Self { store, registry }
    }

    /// Issue a new passcode, respecting the attempt budget of any live
    /// record already occupying the key.
    ///
    /// An existing unlocked record is overwritten (fresh code, attempts
    /// reset); a locked one rejects the request with a retry-after hint
    /// so a lockout cannot be bypassed by re-issuing. Delivery failure
    /// does not roll back the persisted record.
    pub async fn create_otp(&self, req: CreateOtpRequest) -> OtpResult<CreateOtpResponse> {
        let registered = self.registry.get(&req.provider).ok_or_else(|| {
            error!(provider = %req.provider, event = "provider_not_supported", "failed to set passcode");
            OtpError::ProviderNotSupported {
                provider: req.provider.clone(),
            }
        })?;

        // Reject an unreachable destination before any secret is
        // generated or any attempt slot consumed.
        if !req.to.is_empty() {
            if let Err(e) = registered.provider.validate_address(&req.to) {
                error!(error = %e, event = "invalid_address", "invalid `to` address");
                return Err(OtpError::InvalidAddress { message: e });
            }
        }

        if req.ttl.is_zero() {
            error!(event = "missing_ttl", "TTL value cannot be empty");
            return Err(OtpError::MissingTtl);
        }
        if req.max_attempts < 1 {
            error!(event = "missing_max_attempts", "max attempts cannot be empty");
            return Err(OtpError::MissingMaxAttempts);
        }

        let id = if req.id.is_empty() {
            generate_random_string(ID_LENGTH, ALPHANUMERIC_CHARS).map_err(|e| {
                error!(error = %e, event = "id_generation_failed", "error generating id");
                OtpError::IdGenerationFailed
            })?
        } else {
            req.id.clone()
        };

        let code = generate_random_string(registered.provider.max_code_length(), NUMERIC_CHARS)
            .map_err(|e| {
                error!(error = %e, event = "code_generation_failed", "error generating passcode");
                OtpError::CodeGenerationFailed
            })?;

        // A live, locked record at this key blocks re-issue until it
        // expires; anything else is overwritten.
        match self.store.check(&req.namespace, &id, false).await {
            Ok(existing) if existing.is_locked() => {
                warn!(
                    namespace = %req.namespace,
                    event = "max_attempts_exceeded",
                    retry_after_secs = existing.ttl.as_secs(),
                    "passcode attempts exceeded, rejecting re-issue"
                );
                return Err(OtpError::MaxAttemptsExceeded {
                    retry_after: existing.ttl,
                });
            }
            Ok(_) | Err(StoreError::NotFound) => {}
            Err(e) => {
                error!(error = %e, event = "store_check_failed", "error checking passcode status");
                return Err(OtpError::StoreUnavailable {
                    message: e.to_string(),
                });
            }
        }

        let otp = self
            .store
            .set(
                &req.namespace,
                &id,
                Otp {
                    namespace: req.namespace.clone(),
                    id: id.clone(),
                    code,
                    to: req.to.clone(),
                    channel_description: req.channel_description.clone(),
                    address_description: req.address_description.clone(),
                    provider: req.provider.clone(),
                    extra: req.extra.clone().unwrap_or_else(|| b"{}".to_vec()),
                    ttl: req.ttl,
                    max_attempts: req.max_attempts,
                    ..Otp::default()
                },
            )
            .await
            .map_err(|e| {
                error!(error = %e, event = "store_set_failed", "error setting passcode");
                OtpError::StoreUnavailable {
                    message: e.to_string(),
                }
            })?;

        let (subject, body) = render_message(registered, &otp, &req.code_type, &req.root_url);

        if !otp.to.is_empty() && req.deliver {
            if let Err(e) = registered.provider.push(&otp, &subject, &body).await {
                error!(
                    error = %e,
                    provider = %registered.provider.id(),
                    event = "sending_otp_failed",
                    "error sending passcode"
                );
                return Err(OtpError::SendingOtpFailed {
                    provider: registered.provider.id().to_string(),
                    message: e,
                });
            }
            debug!(
                to = %otp.to,
                provider = %registered.provider.id(),
                namespace = %otp.namespace,
                event = "otp_sent",
                "sending passcode"
            );
        }

        let url = view_url(&req.root_url, &otp);
        Ok(CreateOtpResponse {
            otp,
            url,
            subject,
            body,
        })
    }

    /// Verify a candidate code, consuming one attempt. On success the
    /// record is deleted and reported closed.
    pub async fn verify_otp(&self, req: VerifyOtpRequest) -> OtpResult<Otp> {
        if req.id.len() < MIN_ID_LENGTH {
            error!(event = "invalid_id", "id should be min {} chars", MIN_ID_LENGTH);
            return Err(OtpError::Validation {
                message: format!("id should be min {} chars", MIN_ID_LENGTH),
            });
        }
        if req.code.is_empty() {
            error!(event = "empty_code", "passcode is empty");
            return Err(OtpError::Validation {
                message: "passcode is empty".to_string(),
            });
        }

        self.verify(&req.namespace, &req.id, &req.code, true).await
    }

    /// Probe a passcode's state without consuming an attempt, so a
    /// polling client can recover its UI state without burning one of
    /// the limited guesses. Closed records are deleted as cleanup.
    pub async fn check_otp_status(&self, req: CheckOtpStatusRequest) -> OtpResult<Otp> {
        if req.id.len() < MIN_ID_LENGTH {
            error!(event = "invalid_id", "id should be min {} chars", MIN_ID_LENGTH);
            return Err(OtpError::Validation {
                message: format!("id should be min {} chars", MIN_ID_LENGTH),
            });
        }

        let otp = match self.store.check(&req.namespace, &req.id, false).await {
            Ok(otp) => otp,
            Err(StoreError::NotFound) => return Err(OtpError::UnknownOtp),
            Err(e) => {
                error!(error = %e, event = "store_check_failed", "error checking passcode");
                return Err(OtpError::StoreUnavailable {
                    message: e.to_string(),
                });
            }
        };

        if otp.closed {
            if let Err(e) = self.store.delete(&req.namespace, &req.id).await {
                warn!(error = %e, event = "cleanup_failed", "error deleting closed passcode");
            }
        }

        Ok(otp)
    }

    /// Shared verification routine. The attempt increment happens
    /// atomically inside the store's check, and the lock test runs
    /// before the code comparison so a correct code never gets past a
    /// lockout.
    async fn verify(
        &self,
        namespace: &str,
        id: &str,
        candidate: &str,
        delete_on_verify: bool,
    ) -> OtpResult<Otp> {
        let otp = match self.store.check(namespace, id, true).await {
            Ok(otp) => otp,
            Err(StoreError::NotFound) => {
                // Absence and expiry are indistinguishable on purpose.
                return Err(OtpError::UnknownOtp);
            }
            Err(e) => {
                error!(error = %e, event = "store_check_failed", "error checking passcode");
                return Err(OtpError::StoreUnavailable {
                    message: e.to_string(),
                });
            }
        };

        if otp.is_locked() {
            warn!(
                namespace = %namespace,
                event = "max_attempts_exceeded",
                retry_after_secs = otp.ttl.as_secs(),
                "too many passcode attempts"
            );
            return Err(OtpError::MaxAttemptsExceeded {
                retry_after: otp.ttl,
            });
        }

        if !constant_time_eq(otp.code.as_bytes(), candidate.as_bytes()) {
            debug!(
                namespace = %namespace,
                event = "otp_verification_failed",
                remaining_attempts = otp.remaining_attempts(),
                "incorrect passcode"
            );
            return Err(OtpError::InvalidOtp);
        }

        if delete_on_verify {
            self.store.delete(namespace, id).await.map_err(|e| {
                error!(error = %e, event = "store_delete_failed", "error deleting passcode");
                OtpError::StoreUnavailable {
                    message: e.to_string(),
                }
            })?;
        }

        self.store.close(namespace, id).await.map_err(|e| {
            error!(error = %e, event = "store_close_failed", "error closing passcode");
            OtpError::StoreUnavailable {
                message: e.to_string(),
            }
        })?;

        let mut out = otp;
        out.closed = true;
        Ok(out)
    }
}

/// Caller-facing view URL for an issued passcode.
fn view_url(root_url: &str, otp: &Otp) -> String {
    format!("{}/otp/{}/{}", root_url, otp.namespace, otp.id)
}

/// Verification URL embedded in delivered messages.
fn check_url(root_url: &str, otp: &Otp) -> String {
    format!(
        "{}/otp/{}/{}?otp={}&action=check",
        root_url, otp.namespace, otp.id, otp.code
    )
}

fn render_message(
    registered: &RegisteredProvider,
    otp: &Otp,
    code_type: &str,
    root_url: &str,
) -> (String, String) {
    registered.templates.render(&PushData {
        to: otp.to.clone(),
        namespace: otp.namespace.clone(),
        code_type: code_type.to_string(),
        channel: registered.provider.channel_name().to_string(),
        code: otp.code.clone(),
        url: check_url(root_url, otp),
        ttl: otp.ttl,
    })
}

/// Generate a cryptographically secure random string of `len` characters
/// drawn from `charset`. Uses the OS CSPRNG; failure is surfaced rather
/// than papered over, since code unpredictability is a security
/// invariant.
fn generate_random_string(len: usize, charset: &[u8]) -> Result<String, rand::Error> {
    let mut bytes = vec![0u8; len];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(bytes
        .iter()
        .map(|b| charset[*b as usize % charset.len()] as char)
        .collect())
}
