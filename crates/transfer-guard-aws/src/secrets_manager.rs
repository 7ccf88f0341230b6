// crates/transfer-guard-aws/src/secrets_manager.rs
// ============================================================================
// Module: Secrets Manager Store
// Description: Secrets Manager implementation of the secret store capability.
// Purpose: Fetch and provision principal credentials.
// Dependencies: aws-sdk-secretsmanager, transfer-guard-core
// ============================================================================

//! ## Overview
//! Credentials are stored as secret strings. An unknown secret id maps to
//! [`SecretError::NotFound`], which the sync operation branches on.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_secretsmanager::Client;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use transfer_guard_core::Credential;
use transfer_guard_core::SecretError;
use transfer_guard_core::SecretStore;

/// Secrets Manager backed secret store.
#[derive(Clone)]
pub struct SecretsManagerStore {
    /// Secrets Manager client handle.
    client: Client,
}

impl SecretsManagerStore {
    /// Builds a store from shared SDK config.
    #[must_use]
    pub fn new(shared: &SdkConfig) -> Self {
        Self {
            client: Client::new(shared),
        }
    }
}

#[async_trait]
impl SecretStore for SecretsManagerStore {
    async fn get_secret(&self, secret_id: &str) -> Result<Credential, SecretError> {
        let output = match self.client.get_secret_value().secret_id(secret_id).send().await {
            Ok(output) => output,
            Err(err) => {
                let service = err.into_service_error();
                if service.is_resource_not_found_exception() {
                    return Err(SecretError::NotFound(secret_id.to_string()));
                }
                return Err(SecretError::Backend(DisplayErrorContext(&service).to_string()));
            }
        };
        output
            .secret_string()
            .map(Credential::new)
            .ok_or_else(|| SecretError::Backend(format!("{secret_id} has no string value")))
    }

    async fn create_secret(&self, secret_id: &str, value: &Credential) -> Result<(), SecretError> {
        self.client
            .create_secret()
            .name(secret_id)
            .secret_string(value.expose())
            .send()
            .await
            .map_err(|err| SecretError::Backend(DisplayErrorContext(&err).to_string()))?;
        Ok(())
    }

    async fn update_secret(&self, secret_id: &str, value: &Credential) -> Result<(), SecretError> {
        match self
            .client
            .update_secret()
            .secret_id(secret_id)
            .secret_string(value.expose())
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(err) => {
                let service = err.into_service_error();
                if service.is_resource_not_found_exception() {
                    return Err(SecretError::NotFound(secret_id.to_string()));
                }
                Err(SecretError::Backend(DisplayErrorContext(&service).to_string()))
            }
        }
    }
}
