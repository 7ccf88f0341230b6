// crates/transfer-guard-core/src/model.rs
// ============================================================================
// Module: Transfer Guard Data Model
// Description: Per-invocation inputs and outputs of the core handlers.
// Purpose: Carry validated requests, results, freshness queries, and alerts.
// Dependencies: serde, thiserror, time
// ============================================================================

//! ## Overview
//! Every value here is built fresh from a trigger payload, lives for a single
//! invocation, and is never persisted. Constructors reject empty fields so a
//! run never starts from a half-specified request.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::interfaces::TransferEndpoint;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Request construction failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// A required field is empty after trimming.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
    /// A field holds a value the request cannot use.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// Rejection reason.
        reason: String,
    },
}

// ============================================================================
// SECTION: Validation Request
// ============================================================================

/// Inputs for building a [`ValidationRequest`].
#[derive(Debug, Clone)]
pub struct ValidationRequestParams {
    /// Principal (transfer user) name.
    pub principal: String,
    /// Secret identifier holding the principal's credential.
    pub credential_ref: String,
    /// Transfer endpoint host.
    pub host: String,
    /// Transfer endpoint port.
    pub port: u16,
    /// Storage container (bucket) name.
    pub container: String,
    /// Path prefix the principal is confined to.
    pub confined_root: String,
    /// Caller-supplied idempotency token (physical resource id).
    pub idempotency_token: String,
}

/// Immutable input to one validation run.
///
/// # Invariants
/// - Every field is non-empty.
/// - `confined_root` carries no leading or trailing `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRequest {
    /// Principal (transfer user) name.
    principal: String,
    /// Secret identifier holding the principal's credential.
    credential_ref: String,
    /// Transfer endpoint location.
    endpoint: TransferEndpoint,
    /// Storage container name.
    container: String,
    /// Normalized confined root.
    confined_root: String,
    /// Idempotency token echoed back to the orchestrator.
    idempotency_token: String,
}

impl ValidationRequest {
    /// Builds a request, rejecting empty fields.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] when a field is empty or the port is zero.
    pub fn new(params: ValidationRequestParams) -> Result<Self, RequestError> {
        let principal = require("principal", params.principal)?;
        let credential_ref = require("credential_ref", params.credential_ref)?;
        let host = require("host", params.host)?;
        let container = require("container", params.container)?;
        let idempotency_token = require("idempotency_token", params.idempotency_token)?;
        let confined_root = params.confined_root.trim().trim_matches('/').to_string();
        if confined_root.is_empty() {
            return Err(RequestError::EmptyField("confined_root"));
        }
        if params.port == 0 {
            return Err(RequestError::InvalidField {
                field: "port",
                reason: "port must be greater than zero".to_string(),
            });
        }
        Ok(Self {
            principal,
            credential_ref,
            endpoint: TransferEndpoint {
                host,
                port: params.port,
            },
            container,
            confined_root,
            idempotency_token,
        })
    }

    /// Returns the principal name.
    #[must_use]
    pub fn principal(&self) -> &str {
        &self.principal
    }

    /// Returns the credential secret identifier.
    #[must_use]
    pub fn credential_ref(&self) -> &str {
        &self.credential_ref
    }

    /// Returns the transfer endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &TransferEndpoint {
        &self.endpoint
    }

    /// Returns the storage container name.
    #[must_use]
    pub fn container(&self) -> &str {
        &self.container
    }

    /// Returns the normalized confined root.
    #[must_use]
    pub fn confined_root(&self) -> &str {
        &self.confined_root
    }

    /// Returns the idempotency token.
    #[must_use]
    pub fn idempotency_token(&self) -> &str {
        &self.idempotency_token
    }

    /// Returns the storage key of `name` inside the confined root.
    #[must_use]
    pub fn key_in_root(&self, name: &str) -> String {
        format!("{}/{}", self.confined_root, name)
    }

    /// Returns true when `key` is the confined root or lies beneath it.
    #[must_use]
    pub fn is_within_root(&self, key: &str) -> bool {
        key == self.confined_root
            || key
                .strip_prefix(self.confined_root.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// Trims a field and rejects it when empty.
fn require(field: &'static str, value: String) -> Result<String, RequestError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RequestError::EmptyField(field));
    }
    Ok(trimmed.to_string())
}

// ============================================================================
// SECTION: Validation Result
// ============================================================================

/// Outcome of one validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True when every check passed.
    pub success: bool,
    /// Failure reason when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    /// Idempotency token echoed from the request.
    pub idempotency_token: String,
}

impl ValidationResult {
    /// Builds a passing result.
    #[must_use]
    pub fn passed(idempotency_token: impl Into<String>) -> Self {
        Self {
            success: true,
            failure_reason: None,
            idempotency_token: idempotency_token.into(),
        }
    }

    /// Builds a failing result.
    #[must_use]
    pub fn failed(idempotency_token: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            success: false,
            failure_reason: Some(reason.into()),
            idempotency_token: idempotency_token.into(),
        }
    }
}

// ============================================================================
// SECTION: Freshness Query
// ============================================================================

/// Day component of producer upload keys.
const DAY_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Formats a calendar date as `YYYY-MM-DD`.
#[must_use]
pub fn format_day(date: Date) -> String {
    date.format(DAY_FORMAT).unwrap_or_else(|_| date.to_string())
}

/// Set of producers to check for one container and date.
///
/// # Invariants
/// - Producers are unique, non-empty, and carry no trailing `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreshnessQuery {
    /// Producer home paths.
    producers: BTreeSet<String>,
    /// Storage container name.
    container: String,
    /// Target date rendered as `YYYY-MM-DD`.
    day: String,
}

impl FreshnessQuery {
    /// Builds a query, de-duplicating producer paths.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] when the container or a producer path is empty.
    pub fn new<I, S>(producers: I, container: &str, date: Date) -> Result<Self, RequestError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let container = require("container", container.to_string())?;
        let mut set = BTreeSet::new();
        for producer in producers {
            let normalized = producer.as_ref().trim().trim_end_matches('/');
            if normalized.is_empty() {
                return Err(RequestError::EmptyField("producer"));
            }
            set.insert(normalized.to_string());
        }
        Ok(Self {
            producers: set,
            container,
            day: format_day(date),
        })
    }

    /// Returns the producers in sorted order.
    pub fn producers(&self) -> impl Iterator<Item = &str> {
        self.producers.iter().map(String::as_str)
    }

    /// Returns the number of producers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.producers.len()
    }

    /// Returns true when no producers are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.producers.is_empty()
    }

    /// Returns the storage container name.
    #[must_use]
    pub fn container(&self) -> &str {
        &self.container
    }

    /// Returns the target date as `YYYY-MM-DD`.
    #[must_use]
    pub fn day(&self) -> &str {
        &self.day
    }

    /// Returns the listing prefix for a producer: `<producer>/<day>`.
    #[must_use]
    pub fn day_prefix(&self, producer: &str) -> String {
        format!("{producer}/{}", self.day)
    }
}

// ============================================================================
// SECTION: Alert
// ============================================================================

/// Notification raised for missing deliveries.
///
/// # Invariants
/// - Only constructed for a non-empty missing set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    /// Destination topic.
    pub topic: String,
    /// Subject line.
    pub subject: String,
    /// Message body.
    pub body: String,
    /// Producers named in the body.
    pub missing: Vec<String>,
}

impl Alert {
    /// Builds the single alert for a missing set, or `None` when nothing is missing.
    #[must_use]
    pub fn for_missing(topic: &str, day: &str, missing: &[String]) -> Option<Self> {
        if missing.is_empty() {
            return None;
        }
        let mut producers = missing.to_vec();
        producers.sort();
        producers.dedup();
        let subject = format!("Alert - Missing home directory files for: {day}");
        let body = format!(
            "Please notify the following producers that they have not uploaded files for \
             today({day}):\n{}",
            producers.join("\n")
        );
        Some(Self {
            topic: topic.to_string(),
            subject,
            body,
            missing: producers,
        })
    }
}
