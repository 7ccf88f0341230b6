// crates/transfer-guard-core/src/secrets.rs
// ============================================================================
// Module: Secret Sync
// Description: Create-or-update provisioning for principal credentials.
// Purpose: Store a credential under a name whether or not it exists yet.
// Dependencies: crate::interfaces
// ============================================================================

//! ## Overview
//! Operators seed the credential the validator later fetches. The store is
//! probed first: an unknown secret is created, an existing one is updated.
//! Any other probe failure stops the sync without writing.

use crate::interfaces::Credential;
use crate::interfaces::SecretError;
use crate::interfaces::SecretStore;

/// What [`sync_secret`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretSyncOutcome {
    /// The secret did not exist and was created.
    Created,
    /// The secret existed and its value was replaced.
    Updated,
}

impl SecretSyncOutcome {
    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
        }
    }
}

/// Creates `name` with `value`, or updates it when it already exists.
///
/// # Errors
///
/// Returns [`SecretError`] when probing, creating, or updating fails.
pub async fn sync_secret(
    store: &dyn SecretStore,
    name: &str,
    value: &Credential,
) -> Result<SecretSyncOutcome, SecretError> {
    match store.get_secret(name).await {
        Ok(_) => {
            store.update_secret(name, value).await?;
            Ok(SecretSyncOutcome::Updated)
        }
        Err(SecretError::NotFound(_)) => {
            store.create_secret(name, value).await?;
            Ok(SecretSyncOutcome::Created)
        }
        Err(err) => Err(err),
    }
}
