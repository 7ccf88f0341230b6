// crates/transfer-guard-core/src/telemetry.rs
// ============================================================================
// Module: Transfer Guard Event Log
// Description: Structured log events for validation and freshness runs.
// Purpose: Emit JSON-line events without binding the core to a log backend.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Handlers report progress through an [`EventLog`]. The default sink writes
//! one JSON object per line to stderr, which the hosting runtime forwards to
//! its log pipeline. Events never carry credential material.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Event severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Step-level detail.
    Debug,
    /// Normal progress.
    Info,
    /// Degraded but continuing.
    Warn,
    /// Invocation failure.
    Error,
}

/// Structured log event.
#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Severity.
    pub level: LogLevel,
    /// Emitting component.
    pub component: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Correlation identifier (idempotency token or run date).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    /// Additional structured fields.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, Value>,
}

impl LogEvent {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(
        component: &'static str,
        event: &'static str,
        level: LogLevel,
        message: impl Into<String>,
    ) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event,
            timestamp_ms,
            level,
            component,
            message: message.into(),
            correlation_id: None,
            fields: BTreeMap::new(),
        }
    }

    /// Attaches a correlation identifier.
    #[must_use]
    pub fn with_correlation(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Attaches a structured field.
    #[must_use]
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Sink for structured log events.
pub trait EventLog: Send + Sync {
    /// Records one event.
    fn record(&self, event: &LogEvent);
}

/// Event log that writes JSON lines to stderr.
pub struct StderrEventLog {
    /// Events below this level are dropped.
    min_level: LogLevel,
}

impl StderrEventLog {
    /// Creates a stderr log with a minimum level.
    #[must_use]
    pub const fn new(min_level: LogLevel) -> Self {
        Self {
            min_level,
        }
    }
}

impl Default for StderrEventLog {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}

impl EventLog for StderrEventLog {
    fn record(&self, event: &LogEvent) {
        if event.level < self.min_level {
            return;
        }
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// No-op event log.
pub struct NoopEventLog;

impl EventLog for NoopEventLog {
    fn record(&self, _event: &LogEvent) {}
}

/// Event log that keeps events in memory.
#[derive(Default)]
pub struct MemoryEventLog {
    /// Recorded events in arrival order.
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryEventLog {
    /// Creates an empty in-memory log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }
}

impl EventLog for MemoryEventLog {
    fn record(&self, event: &LogEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
