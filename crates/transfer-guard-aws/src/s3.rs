// crates/transfer-guard-aws/src/s3.rs
// ============================================================================
// Module: S3 Object Store
// Description: S3-backed implementation of the object store capability.
// Purpose: Direct bucket access for probe writes, read-back, and listings.
// Dependencies: aws-sdk-s3, tokio, transfer-guard-core
// ============================================================================

//! ## Overview
//! Keys are used verbatim; the validator and monitor already build full keys.
//! Reads are size-bounded and a missing key is reported as
//! [`StorageError::NotFound`] so the read-back retry can tell lag from failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use tokio::io::AsyncReadExt;
use transfer_guard_config::AwsConfig;
use transfer_guard_config::DEFAULT_MAX_OBJECT_BYTES;
use transfer_guard_core::ObjectStore;
use transfer_guard_core::ObjectSummary;
use transfer_guard_core::StorageError;

// ============================================================================
// SECTION: Store
// ============================================================================

/// S3-backed object store.
#[derive(Clone)]
pub struct S3ObjectStore {
    /// S3 client handle.
    client: Client,
    /// Upper bound on bytes read per object.
    max_object_bytes: usize,
}

impl S3ObjectStore {
    /// Builds a store from shared SDK config and addressing options.
    #[must_use]
    pub fn new(shared: &SdkConfig, config: &AwsConfig) -> Self {
        let mut builder = aws_sdk_s3::config::Builder::from(shared);
        if config.force_path_style {
            builder = builder.force_path_style(true);
        }
        Self::from_client(Client::from_conf(builder.build()))
    }

    /// Wraps an existing client.
    #[must_use]
    pub const fn from_client(client: Client) -> Self {
        Self {
            client,
            max_object_bytes: DEFAULT_MAX_OBJECT_BYTES,
        }
    }

    /// Overrides the per-object read limit.
    #[must_use]
    pub const fn with_max_object_bytes(mut self, max_object_bytes: usize) -> Self {
        self.max_object_bytes = max_object_bytes;
        self
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, container: &str, key: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(container)
            .key(key)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|err| StorageError::Backend(DisplayErrorContext(&err).to_string()))?;
        Ok(())
    }

    async fn get(&self, container: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        let output = match self.client.get_object().bucket(container).key(key).send().await {
            Ok(output) => output,
            Err(err) => {
                let service = err.into_service_error();
                if service.is_no_such_key() {
                    return Err(StorageError::NotFound(format!("{container}/{key}")));
                }
                return Err(StorageError::Backend(DisplayErrorContext(&service).to_string()));
            }
        };
        if let Some(length) = output.content_length() {
            let declared = usize::try_from(length).unwrap_or(usize::MAX);
            ensure_within_limit(container, key, declared, self.max_object_bytes)?;
        }
        let mut reader = output.body.into_async_read();
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 8192];
        loop {
            let read =
                reader.read(&mut chunk).await.map_err(|err| StorageError::Io(err.to_string()))?;
            if read == 0 {
                break;
            }
            ensure_within_limit(
                container,
                key,
                buffer.len().saturating_add(read),
                self.max_object_bytes,
            )?;
            buffer.extend_from_slice(&chunk[.. read]);
        }
        Ok(buffer)
    }

    async fn list(
        &self,
        container: &str,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<ObjectSummary>, StorageError> {
        let max_keys = i32::try_from(limit.max(1)).unwrap_or(i32::MAX);
        let output = match self
            .client
            .list_objects_v2()
            .bucket(container)
            .prefix(prefix)
            .max_keys(max_keys)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                let service = err.into_service_error();
                if service.is_no_such_bucket() {
                    return Err(StorageError::NotFound(container.to_string()));
                }
                return Err(StorageError::Backend(DisplayErrorContext(&service).to_string()));
            }
        };
        Ok(output
            .contents()
            .iter()
            .filter_map(|object| {
                object.key().map(|key| ObjectSummary {
                    key: key.to_string(),
                    size: object.size().and_then(|size| u64::try_from(size).ok()),
                })
            })
            .take(limit)
            .collect())
    }
}

/// Rejects objects larger than the per-object read cap.
fn ensure_within_limit(
    container: &str,
    key: &str,
    size: usize,
    limit: usize,
) -> Result<(), StorageError> {
    if size > limit {
        return Err(StorageError::Io(format!("{container}/{key} exceeds {limit} bytes")));
    }
    Ok(())
}
