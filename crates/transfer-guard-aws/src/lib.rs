// crates/transfer-guard-aws/src/lib.rs
// ============================================================================
// Module: Transfer Guard AWS Adapters
// Description: Production implementations of the core capability traits.
// Purpose: Bind the handlers to S3, SNS, Secrets Manager, and SFTP.
// Dependencies: aws-config, aws-sdk-*, ssh2, transfer-guard-core
// ============================================================================

//! ## Overview
//! Every adapter is built from one shared SDK config (see
//! [`load_sdk_config`]) so region and endpoint overrides apply uniformly.
//! [`Adapters`] bundles them for the CLI host.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod s3;
pub mod sdk;
pub mod secrets_manager;
pub mod sftp;
pub mod sns;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use transfer_guard_config::TransferGuardConfig;
use transfer_guard_core::AlertSink;
use transfer_guard_core::ObjectStore;
use transfer_guard_core::SecretStore;
use transfer_guard_core::TransferConnector;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use s3::S3ObjectStore;
pub use sdk::load_sdk_config;
pub use secrets_manager::SecretsManagerStore;
pub use sftp::SftpConnector;
pub use sns::SnsAlertSink;

// ============================================================================
// SECTION: Adapter Bundle
// ============================================================================

/// Production adapters for one process.
#[derive(Clone)]
pub struct Adapters {
    /// Object storage.
    pub storage: Arc<dyn ObjectStore>,
    /// Alert channel.
    pub alerts: Arc<dyn AlertSink>,
    /// Secret store.
    pub secrets: Arc<dyn SecretStore>,
    /// Transfer endpoint connector.
    pub transfer: Arc<dyn TransferConnector>,
}

impl Adapters {
    /// Builds every adapter from the process configuration.
    pub async fn from_config(config: &TransferGuardConfig) -> Self {
        let shared = load_sdk_config(&config.aws).await;
        Self {
            storage: Arc::new(
                S3ObjectStore::new(&shared, &config.aws)
                    .with_max_object_bytes(config.aws.max_object_bytes),
            ),
            alerts: Arc::new(SnsAlertSink::new(&shared)),
            secrets: Arc::new(SecretsManagerStore::new(&shared)),
            transfer: Arc::new(SftpConnector::new(config.validation.connect_timeout())),
        }
    }
}
