// crates/transfer-guard-core/src/validator.rs
// ============================================================================
// Module: Isolation Validator
// Description: Deploy-time read/write and isolation checks for a principal.
// Purpose: Prove a new principal's live access is functional and confined.
// Dependencies: crate::{interfaces, model, settle, telemetry}, rand, thiserror
// ============================================================================

//! ## Overview
//! A validation run connects to the transfer endpoint as the principal and
//! runs two checks in order:
//!
//! - Read/write: upload random content under a random name, wait for the
//!   store to settle, then read it back directly from storage and require a
//!   byte-identical copy.
//! - Isolation: write a probe object outside the confined root directly to
//!   storage, wait, then try to download it as the principal. The download
//!   must fail.
//!
//! A read/write failure aborts before the isolation check. Any probe error
//! surfaces as a [`ValidationError`], except the isolation download failure,
//! which is the passing outcome.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::interfaces::ObjectStore;
use crate::interfaces::SecretError;
use crate::interfaces::SecretStore;
use crate::interfaces::StorageError;
use crate::interfaces::TransferConnector;
use crate::interfaces::TransferError;
use crate::interfaces::TransferSession;
use crate::model::ValidationRequest;
use crate::model::ValidationResult;
use crate::settle::SettlePolicy;
use crate::settle::settle;
use crate::settle::settle_then_retry;
use crate::telemetry::EventLog;
use crate::telemetry::LogEvent;
use crate::telemetry::LogLevel;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Component label for log events.
const COMPONENT: &str = "isolation_validator";
/// Default prefix for isolation probe objects.
pub const DEFAULT_OUTSIDE_PREFIX: &str = "not-your-home-dir";
/// Body written to isolation probe objects.
const ISOLATION_PROBE_BODY: &[u8] = b"should not be able to read this";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Validation failures.
///
/// # Invariants
/// - Variants are stable for error classification.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Credential retrieval failed.
    #[error("credential retrieval failed: {0}")]
    Secret(#[source] SecretError),
    /// Connecting or authenticating to the endpoint failed.
    #[error("transfer connect failed: {0}")]
    Connect(#[source] TransferError),
    /// A transfer operation expected to succeed failed.
    #[error("transfer operation failed: {0}")]
    Transfer(#[source] TransferError),
    /// A storage operation failed.
    #[error("storage operation failed: {0}")]
    Storage(#[source] StorageError),
    /// The stored copy differs from the uploaded content.
    #[error(
        "file content mismatch at {key}: expected {expected_len} bytes, found {actual_len} bytes, \
         first difference at byte {first_difference}"
    )]
    ContentMismatch {
        /// Storage key that was compared.
        key: String,
        /// Uploaded length.
        expected_len: usize,
        /// Stored length.
        actual_len: usize,
        /// Offset of the first differing byte.
        first_difference: usize,
    },
    /// The principal read an object outside its confined root.
    #[error("isolation breach: principal read {key} outside its confined root")]
    IsolationBreach {
        /// Storage key that should have been unreadable.
        key: String,
    },
    /// The probe location would fall inside the confined root.
    #[error("isolation probe path {0} lies inside the confined root")]
    InvalidProbePath(String),
}

// ============================================================================
// SECTION: Validator Interface
// ============================================================================

/// Validates a principal's live access.
#[async_trait]
pub trait AccessValidator: Send + Sync {
    /// Runs every check for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for the first failed check.
    async fn validate(&self, request: &ValidationRequest) -> Result<(), ValidationError>;
}

/// Tunables for [`IsolationValidator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorOptions {
    /// Consistency wait policy.
    pub settle: SettlePolicy,
    /// Prefix under which isolation probes are written.
    pub outside_prefix: String,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            settle: SettlePolicy::default(),
            outside_prefix: DEFAULT_OUTSIDE_PREFIX.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Isolation Validator
// ============================================================================

/// Runs the read/write and isolation checks against live probes.
pub struct IsolationValidator {
    /// Credential source.
    secrets: Arc<dyn SecretStore>,
    /// Direct storage access, bypassing the transfer endpoint.
    storage: Arc<dyn ObjectStore>,
    /// Transfer endpoint client factory.
    transfer: Arc<dyn TransferConnector>,
    /// Validator tunables.
    options: ValidatorOptions,
    /// Event sink.
    log: Arc<dyn EventLog>,
}

impl IsolationValidator {
    /// Creates a validator over the given probes.
    #[must_use]
    pub fn new(
        secrets: Arc<dyn SecretStore>,
        storage: Arc<dyn ObjectStore>,
        transfer: Arc<dyn TransferConnector>,
        options: ValidatorOptions,
        log: Arc<dyn EventLog>,
    ) -> Self {
        Self {
            secrets,
            storage,
            transfer,
            options,
            log,
        }
    }

    /// Runs the checks and folds the outcome into a [`ValidationResult`].
    pub async fn run(&self, request: &ValidationRequest) -> ValidationResult {
        match self.validate(request).await {
            Ok(()) => ValidationResult::passed(request.idempotency_token()),
            Err(err) => ValidationResult::failed(request.idempotency_token(), err.to_string()),
        }
    }

    /// Builds an event tagged with the request's token and principal.
    fn event(
        request: &ValidationRequest,
        event: &'static str,
        level: LogLevel,
        message: &str,
    ) -> LogEvent {
        LogEvent::new(COMPONENT, event, level, message)
            .with_correlation(request.idempotency_token())
            .with_field("principal", request.principal())
    }

    /// Records an event tagged with the request's token.
    fn emit(&self, request: &ValidationRequest, event: &'static str, level: LogLevel, message: &str) {
        self.log.record(&Self::event(request, event, level, message));
    }

    /// Check A: upload through the endpoint, read back from storage.
    async fn check_read_write(
        &self,
        session: &dyn TransferSession,
        request: &ValidationRequest,
    ) -> Result<(), ValidationError> {
        let name = probe_token();
        let content = probe_token().into_bytes();
        session.put(content.clone(), &name).await.map_err(ValidationError::Transfer)?;
        self.emit(request, "read_write_uploaded", LogLevel::Debug, "probe uploaded");

        let key = request.key_in_root(&name);
        let storage = &self.storage;
        let container = request.container();
        let key_ref = key.as_str();
        let stored = settle_then_retry(
            &self.options.settle,
            move || storage.get(container, key_ref),
            |err| matches!(err, StorageError::NotFound(_)),
        )
        .await
        .map_err(ValidationError::Storage)?;

        if stored != content {
            let first_difference = content
                .iter()
                .zip(stored.iter())
                .position(|(expected, actual)| expected != actual)
                .unwrap_or_else(|| content.len().min(stored.len()));
            return Err(ValidationError::ContentMismatch {
                key,
                expected_len: content.len(),
                actual_len: stored.len(),
                first_difference,
            });
        }
        self.emit(request, "read_write_passed", LogLevel::Info, "stored copy matches upload");
        Ok(())
    }

    /// Check B: a probe outside the confined root must be unreadable.
    async fn check_isolation(
        &self,
        session: &dyn TransferSession,
        request: &ValidationRequest,
    ) -> Result<(), ValidationError> {
        let key = format!("{}/{}.txt", self.options.outside_prefix.trim_matches('/'), probe_token());
        if request.is_within_root(&key) {
            return Err(ValidationError::InvalidProbePath(key));
        }
        self.storage
            .put(request.container(), &key, ISOLATION_PROBE_BODY.to_vec())
            .await
            .map_err(ValidationError::Storage)?;
        settle(&self.options.settle).await;

        let remote = format!("/{}/{}", request.container(), key);
        match session.get(&remote).await {
            Ok(_) => {
                self.emit(request, "isolation_breach", LogLevel::Error, "outside probe was readable");
                Err(ValidationError::IsolationBreach {
                    key,
                })
            }
            // Denial is the passing outcome. The contract is "cannot read", so the
            // cause is recorded but never judged.
            Err(denial) => {
                let entry = Self::event(
                    request,
                    "isolation_passed",
                    LogLevel::Info,
                    "outside probe unreadable as expected",
                )
                .with_field("outcome", "denied_as_expected")
                .with_field("denial_kind", denial.kind());
                self.log.record(&entry);
                Ok(())
            }
        }
    }
}

#[async_trait]
impl AccessValidator for IsolationValidator {
    async fn validate(&self, request: &ValidationRequest) -> Result<(), ValidationError> {
        self.emit(request, "validation_started", LogLevel::Info, "validation run started");
        let credential = self
            .secrets
            .get_secret(request.credential_ref())
            .await
            .map_err(ValidationError::Secret)?;
        let session = self
            .transfer
            .connect(request.endpoint(), request.principal(), &credential)
            .await
            .map_err(ValidationError::Connect)?;
        self.emit(request, "transfer_connected", LogLevel::Debug, "transfer session open");

        let outcome = async {
            self.check_read_write(&*session, request).await?;
            self.check_isolation(&*session, request).await
        }
        .await;
        match &outcome {
            Ok(()) => {
                self.emit(request, "validation_passed", LogLevel::Info, "all checks passed");
            }
            Err(err) => {
                self.emit(request, "validation_failed", LogLevel::Error, &err.to_string());
            }
        }
        outcome
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns 128 random bits as lowercase hex.
fn probe_token() -> String {
    format!("{:032x}", rand::random::<u128>())
}

#[cfg(test)]
mod tests;
