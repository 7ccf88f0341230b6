// crates/transfer-guard-core/src/interfaces.rs
// ============================================================================
// Module: Transfer Guard Interfaces
// Description: Capability traits for storage, transfer, secrets, and alerts.
// Purpose: Define the contract surfaces the core handlers are driven through.
// Dependencies: async-trait, thiserror
// ============================================================================

//! ## Overview
//! The core never talks to a cloud SDK or a network socket directly. Each
//! external collaborator is a trait here, implemented for production in
//! `transfer-guard-aws` and by in-memory fakes in tests.
//!
//! Every error enum keeps "not found" distinguishable from other failures,
//! since callers branch on it (secret sync, storage read-back retry).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::Alert;

// ============================================================================
// SECTION: Credential
// ============================================================================

/// Credential material fetched from the secret store.
///
/// # Invariants
/// - The value is never rendered by `Debug` or `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps raw credential material.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw credential material.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

// ============================================================================
// SECTION: Object Storage
// ============================================================================

/// Object storage failures.
///
/// # Invariants
/// - Variants are stable for error classification.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The object or container does not exist.
    #[error("object not found: {0}")]
    NotFound(String),
    /// The storage backend rejected or failed the request.
    #[error("storage backend error: {0}")]
    Backend(String),
    /// Transport or body streaming failure.
    #[error("storage io error: {0}")]
    Io(String),
}

/// Listing entry returned by [`ObjectStore::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    /// Full object key.
    pub key: String,
    /// Object size in bytes when reported.
    pub size: Option<u64>,
}

/// Object storage capability.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Writes an object.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the write fails.
    async fn put(&self, container: &str, key: &str, bytes: Vec<u8>) -> Result<(), StorageError>;

    /// Reads an object in full.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] when the key does not exist, and
    /// other variants for backend failures.
    async fn get(&self, container: &str, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Lists at most `limit` objects whose key begins with `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the listing fails.
    async fn list(
        &self,
        container: &str,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<ObjectSummary>, StorageError>;
}

// ============================================================================
// SECTION: Transfer Endpoint
// ============================================================================

/// Default port for the file-transfer protocol.
pub const DEFAULT_TRANSFER_PORT: u16 = 22;

/// Network location of the transfer endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEndpoint {
    /// Host name or address.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Transfer protocol failures.
///
/// # Invariants
/// - Variants are stable for error classification.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The principal could not authenticate.
    #[error("transfer authentication failed: {0}")]
    Authentication(String),
    /// The principal is not allowed to access the path.
    #[error("transfer authorization denied: {0}")]
    Authorization(String),
    /// The remote path does not resolve.
    #[error("transfer path not found: {0}")]
    NotFound(String),
    /// Protocol-level failure (handshake, channel, unexpected status).
    #[error("transfer protocol error: {0}")]
    Protocol(String),
    /// Socket or local I/O failure.
    #[error("transfer io error: {0}")]
    Io(String),
}

impl TransferError {
    /// Returns a stable label for the failure class.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Authentication(_) => "authentication",
            Self::Authorization(_) => "authorization",
            Self::NotFound(_) => "not_found",
            Self::Protocol(_) => "protocol",
            Self::Io(_) => "io",
        }
    }
}

/// An authenticated transfer session scoped to one principal.
#[async_trait]
pub trait TransferSession: Send + Sync {
    /// Uploads `bytes` to `remote_name`, resolved against the principal's home.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError`] when the upload fails.
    async fn put(&self, bytes: Vec<u8>, remote_name: &str) -> Result<(), TransferError>;

    /// Downloads `remote_name` in full.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError`] when the path cannot be read.
    async fn get(&self, remote_name: &str) -> Result<Vec<u8>, TransferError>;
}

/// Opens authenticated transfer sessions.
#[async_trait]
pub trait TransferConnector: Send + Sync {
    /// Connects and authenticates `principal` with `credential`.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError`] when the connection or authentication fails.
    async fn connect(
        &self,
        endpoint: &TransferEndpoint,
        principal: &str,
        credential: &Credential,
    ) -> Result<Box<dyn TransferSession>, TransferError>;
}

// ============================================================================
// SECTION: Secret Store
// ============================================================================

/// Secret store failures.
///
/// # Invariants
/// - `NotFound` is reported only when the secret does not exist.
#[derive(Debug, Error)]
pub enum SecretError {
    /// The secret does not exist.
    #[error("secret not found: {0}")]
    NotFound(String),
    /// Any other secret store failure.
    #[error("secret store error: {0}")]
    Backend(String),
}

/// Secret retrieval and provisioning capability.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetches the credential stored under `secret_id`.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::NotFound`] for an unknown id.
    async fn get_secret(&self, secret_id: &str) -> Result<Credential, SecretError>;

    /// Creates a new secret.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError`] when creation fails.
    async fn create_secret(&self, secret_id: &str, value: &Credential) -> Result<(), SecretError>;

    /// Replaces the value of an existing secret.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError`] when the update fails.
    async fn update_secret(&self, secret_id: &str, value: &Credential) -> Result<(), SecretError>;
}

// ============================================================================
// SECTION: Alert Sink
// ============================================================================

/// Alert publication failures.
#[derive(Debug, Error)]
pub enum AlertError {
    /// The notification channel rejected the message.
    #[error("alert publish failed: {0}")]
    Publish(String),
}

/// Notification channel capability.
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Publishes one alert to its topic.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError`] when publication fails.
    async fn publish(&self, alert: &Alert) -> Result<(), AlertError>;
}
