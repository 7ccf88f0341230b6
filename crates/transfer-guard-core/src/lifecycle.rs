// crates/transfer-guard-core/src/lifecycle.rs
// ============================================================================
// Module: Lifecycle Handler
// Description: Create/Update/Delete adapter around the access validator.
// Purpose: Acknowledge provisioning events, failing hard on broken access.
// Dependencies: crate::{model, validator, telemetry}, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A provisioning orchestrator sends one event per deployment step. The
//! handler is a pure mapping from event to acknowledgement or error:
//!
//! - `Create` / `Update`: parse the resource properties into a
//!   [`ValidationRequest`], run the validator, and echo the request's
//!   idempotency token. Validation failures propagate as hard errors.
//! - `Delete`: no validation. Echo the `PhysicalResourceId` the orchestrator
//!   sent, so teardown correlates with the resource that was created.
//!
//! The wire shape follows the custom-resource event and response format
//! (`RequestType`, `StackId`, `RequestId`, `LogicalResourceId`,
//! `PhysicalResourceId`, `ResourceProperties`).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::interfaces::DEFAULT_TRANSFER_PORT;
use crate::model::RequestError;
use crate::model::ValidationRequest;
use crate::model::ValidationRequestParams;
use crate::telemetry::EventLog;
use crate::telemetry::LogEvent;
use crate::telemetry::LogLevel;
use crate::validator::AccessValidator;
use crate::validator::ValidationError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Component label for log events.
const COMPONENT: &str = "lifecycle_handler";
/// Property carrying the idempotency token.
pub const PROP_PHYSICAL_RESOURCE_ID: &str = "physicalResourceId";
/// Property carrying the endpoint host.
pub const PROP_HOST: &str = "sftpHost";
/// Property carrying the endpoint port.
pub const PROP_PORT: &str = "sftpPort";
/// Property carrying the principal name.
pub const PROP_USER_NAME: &str = "userName";
/// Property carrying the credential secret id.
pub const PROP_SECRET_NAME: &str = "privateKeySecretName";
/// Property carrying the storage container.
pub const PROP_BUCKET_NAME: &str = "bucketName";
/// Property carrying the confined root.
pub const PROP_HOME_FOLDER: &str = "homeFolder";
/// Properties required on Create and Update.
pub const REQUIRED_PROPERTIES: [&str; 6] = [
    PROP_PHYSICAL_RESOURCE_ID,
    PROP_HOST,
    PROP_USER_NAME,
    PROP_SECRET_NAME,
    PROP_BUCKET_NAME,
    PROP_HOME_FOLDER,
];

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Lifecycle request type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestType {
    /// Resource is being created.
    Create,
    /// Resource properties changed.
    Update,
    /// Resource is being torn down.
    Delete,
}

/// Incoming lifecycle event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleEvent {
    /// Request type.
    pub request_type: RequestType,
    /// Stack correlation identifier; required so the acknowledgement can echo it.
    pub stack_id: String,
    /// Request correlation identifier.
    pub request_id: String,
    /// Logical resource identifier.
    pub logical_resource_id: String,
    /// Identifier of the resource being updated or deleted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,
    /// Free-form resource properties.
    #[serde(default)]
    pub resource_properties: Map<String, Value>,
}

/// Acknowledgement status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseStatus {
    /// The event was handled.
    #[serde(rename = "SUCCESS")]
    Success,
}

/// Acknowledgement returned to the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleResponse {
    /// Outcome status.
    pub status: ResponseStatus,
    /// Idempotency token for the resource.
    pub physical_resource_id: String,
    /// Echoed stack identifier.
    pub stack_id: String,
    /// Echoed request identifier.
    pub request_id: String,
    /// Echoed logical resource identifier.
    pub logical_resource_id: String,
    /// Resource attributes (empty on Create/Update, absent on Delete).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
}

impl LifecycleResponse {
    /// Builds a success acknowledgement echoing the event's correlation ids.
    fn acknowledge(
        event: &LifecycleEvent,
        physical_resource_id: &str,
        data: Option<Map<String, Value>>,
    ) -> Self {
        Self {
            status: ResponseStatus::Success,
            physical_resource_id: physical_resource_id.to_string(),
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            data,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Lifecycle handling failures; each one fails the deployment.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// One or more required properties are absent or blank.
    #[error("missing required properties: {}", .0.join(", "))]
    MissingProperties(Vec<String>),
    /// A property is present but unusable.
    #[error("invalid property {name}: {reason}")]
    InvalidProperty {
        /// Property name.
        name: String,
        /// Rejection reason.
        reason: String,
    },
    /// A Delete event arrived without a physical resource id.
    #[error("delete event is missing PhysicalResourceId")]
    MissingPhysicalResourceId,
    /// The validation run failed.
    #[error("validation failed: {0}")]
    Validation(#[source] ValidationError),
}

impl From<RequestError> for LifecycleError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::EmptyField(field) => Self::MissingProperties(vec![field.to_string()]),
            RequestError::InvalidField {
                field,
                reason,
            } => Self::InvalidProperty {
                name: field.to_string(),
                reason,
            },
        }
    }
}

// ============================================================================
// SECTION: Property Parsing
// ============================================================================

/// Parses Create/Update properties into a validation request.
///
/// Every absent or blank required property is reported together.
///
/// # Errors
///
/// Returns [`LifecycleError::MissingProperties`] or
/// [`LifecycleError::InvalidProperty`] when the properties are unusable.
pub fn parse_request(
    properties: &Map<String, Value>,
    default_port: u16,
) -> Result<ValidationRequest, LifecycleError> {
    let mut missing = Vec::new();
    let mut values = Vec::with_capacity(REQUIRED_PROPERTIES.len());
    for name in REQUIRED_PROPERTIES {
        match properties.get(name) {
            None | Some(Value::Null) => missing.push(name.to_string()),
            Some(Value::String(text)) if text.trim().is_empty() => missing.push(name.to_string()),
            Some(Value::String(text)) => values.push(text.clone()),
            Some(Value::Number(number)) => values.push(number.to_string()),
            Some(_) => {
                return Err(LifecycleError::InvalidProperty {
                    name: name.to_string(),
                    reason: "expected a string".to_string(),
                });
            }
        }
    }
    if !missing.is_empty() {
        return Err(LifecycleError::MissingProperties(missing));
    }
    let port = parse_port(properties.get(PROP_PORT), default_port)?;
    let [token, host, principal, credential_ref, container, confined_root] =
        <[String; 6]>::try_from(values).map_err(|_| LifecycleError::InvalidProperty {
            name: "ResourceProperties".to_string(),
            reason: "property count mismatch".to_string(),
        })?;
    Ok(ValidationRequest::new(ValidationRequestParams {
        principal,
        credential_ref,
        host,
        port,
        container,
        confined_root,
        idempotency_token: token,
    })?)
}

/// Parses the optional port property.
fn parse_port(value: Option<&Value>, default_port: u16) -> Result<u16, LifecycleError> {
    let invalid = |reason: &str| LifecycleError::InvalidProperty {
        name: PROP_PORT.to_string(),
        reason: reason.to_string(),
    };
    let port = match value {
        None | Some(Value::Null) => return Ok(default_port),
        Some(Value::String(text)) if text.trim().is_empty() => return Ok(default_port),
        Some(Value::String(text)) => {
            text.trim().parse::<u16>().map_err(|_| invalid("expected a port number"))?
        }
        Some(Value::Number(number)) => number
            .as_u64()
            .and_then(|raw| u16::try_from(raw).ok())
            .ok_or_else(|| invalid("expected a port number"))?,
        Some(_) => return Err(invalid("expected a port number")),
    };
    if port == 0 {
        return Err(invalid("port must be greater than zero"));
    }
    Ok(port)
}

// ============================================================================
// SECTION: Handler
// ============================================================================

/// Dispatches lifecycle events to the validator.
pub struct LifecycleHandler {
    /// Validator run on Create and Update.
    validator: Arc<dyn AccessValidator>,
    /// Port used when the event omits one.
    default_port: u16,
    /// Event sink.
    log: Arc<dyn EventLog>,
}

impl LifecycleHandler {
    /// Creates a handler with the standard transfer port.
    #[must_use]
    pub fn new(validator: Arc<dyn AccessValidator>, log: Arc<dyn EventLog>) -> Self {
        Self {
            validator,
            default_port: DEFAULT_TRANSFER_PORT,
            log,
        }
    }

    /// Overrides the port used when the event omits one.
    #[must_use]
    pub const fn with_default_port(mut self, port: u16) -> Self {
        self.default_port = port;
        self
    }

    /// Handles one lifecycle event.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError`] when properties are missing or validation fails.
    pub async fn handle(&self, event: &LifecycleEvent) -> Result<LifecycleResponse, LifecycleError> {
        let result = match event.request_type {
            RequestType::Create | RequestType::Update => self.handle_upsert(event).await,
            RequestType::Delete => Self::handle_delete(event),
        };
        match &result {
            Ok(response) => self.log.record(
                &LogEvent::new(COMPONENT, "lifecycle_acknowledged", LogLevel::Info, "event acknowledged")
                    .with_correlation(response.physical_resource_id.clone())
                    .with_field("request_type", request_type_label(event.request_type))
                    .with_field("request_id", event.request_id.clone()),
            ),
            Err(err) => self.log.record(
                &LogEvent::new(COMPONENT, "lifecycle_failed", LogLevel::Error, err.to_string())
                    .with_field("request_type", request_type_label(event.request_type))
                    .with_field("request_id", event.request_id.clone()),
            ),
        }
        result
    }

    /// Create/Update: parse, validate, acknowledge with the request's token.
    async fn handle_upsert(&self, event: &LifecycleEvent) -> Result<LifecycleResponse, LifecycleError> {
        let request = parse_request(&event.resource_properties, self.default_port)?;
        self.validator.validate(&request).await.map_err(LifecycleError::Validation)?;
        Ok(LifecycleResponse::acknowledge(event, request.idempotency_token(), Some(Map::new())))
    }

    /// Delete: acknowledge with the event's own physical resource id, unvalidated.
    fn handle_delete(event: &LifecycleEvent) -> Result<LifecycleResponse, LifecycleError> {
        let physical_resource_id = event
            .physical_resource_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or(LifecycleError::MissingPhysicalResourceId)?;
        Ok(LifecycleResponse::acknowledge(event, physical_resource_id, None))
    }
}

/// Returns the wire label for a request type.
const fn request_type_label(request_type: RequestType) -> &'static str {
    match request_type {
        RequestType::Create => "Create",
        RequestType::Update => "Update",
        RequestType::Delete => "Delete",
    }
}
