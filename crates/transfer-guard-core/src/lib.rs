// crates/transfer-guard-core/src/lib.rs
// ============================================================================
// Module: Transfer Guard Core Library
// Description: Public API surface for the Transfer Guard core.
// Purpose: Expose the data model, capability interfaces, and operational handlers.
// Dependencies: crate::{model, interfaces, settle, telemetry, validator, lifecycle, freshness}
// ============================================================================

//! ## Overview
//! Transfer Guard core holds the two operational handlers of a managed
//! file-transfer deployment: the deploy-time isolation validator (wrapped in
//! the Create/Update/Delete lifecycle protocol) and the scheduled data
//! freshness monitor. Object storage, the transfer endpoint, the secret store,
//! and the alert channel are reached only through the traits in
//! [`interfaces`], so every handler can run against in-memory fakes.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod freshness;
pub mod interfaces;
pub mod lifecycle;
pub mod model;
pub mod secrets;
pub mod settle;
pub mod telemetry;
pub mod validator;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use freshness::FreshnessError;
pub use freshness::FreshnessMonitor;
pub use freshness::FreshnessReport;
pub use freshness::FreshnessSettings;
pub use freshness::find_missing;
pub use interfaces::AlertError;
pub use interfaces::AlertSink;
pub use interfaces::Credential;
pub use interfaces::ObjectStore;
pub use interfaces::ObjectSummary;
pub use interfaces::SecretError;
pub use interfaces::SecretStore;
pub use interfaces::StorageError;
pub use interfaces::TransferConnector;
pub use interfaces::TransferEndpoint;
pub use interfaces::TransferError;
pub use interfaces::TransferSession;
pub use lifecycle::LifecycleError;
pub use lifecycle::LifecycleEvent;
pub use lifecycle::LifecycleHandler;
pub use lifecycle::LifecycleResponse;
pub use lifecycle::RequestType;
pub use lifecycle::ResponseStatus;
pub use model::Alert;
pub use model::FreshnessQuery;
pub use model::RequestError;
pub use model::ValidationRequest;
pub use model::ValidationRequestParams;
pub use model::ValidationResult;
pub use model::format_day;
pub use secrets::SecretSyncOutcome;
pub use secrets::sync_secret;
pub use settle::SettlePolicy;
pub use settle::settle_then_retry;
pub use telemetry::EventLog;
pub use telemetry::LogEvent;
pub use telemetry::LogLevel;
pub use telemetry::MemoryEventLog;
pub use telemetry::NoopEventLog;
pub use telemetry::StderrEventLog;
pub use validator::AccessValidator;
pub use validator::IsolationValidator;
pub use validator::ValidationError;
pub use validator::ValidatorOptions;
