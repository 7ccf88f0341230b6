// crates/transfer-guard-core/src/freshness.rs
// ============================================================================
// Module: Freshness Monitor
// Description: Daily check that every producer delivered a file for the day.
// Purpose: Raise one consolidated alert naming the producers that are late.
// Dependencies: crate::{interfaces, model, telemetry}, thiserror, time, tokio
// ============================================================================

//! ## Overview
//! For each configured producer the monitor asks storage whether at least one
//! object exists under `<producer>/<YYYY-MM-DD>`. Existence checks fan out
//! under a concurrency bound. The missing set is either complete or the run
//! fails: a storage error aborts before any alert is published, so a partial
//! set never reaches the channel.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use time::Date;
use time::OffsetDateTime;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::interfaces::AlertError;
use crate::interfaces::AlertSink;
use crate::interfaces::ObjectStore;
use crate::interfaces::StorageError;
use crate::model::Alert;
use crate::model::FreshnessQuery;
use crate::model::RequestError;
use crate::telemetry::EventLog;
use crate::telemetry::LogEvent;
use crate::telemetry::LogLevel;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Component label for log events.
const COMPONENT: &str = "freshness_monitor";
/// Default bound on concurrent existence checks.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Freshness run failures.
#[derive(Debug, Error)]
pub enum FreshnessError {
    /// The configured producers or container are unusable.
    #[error("invalid freshness query: {0}")]
    Request(#[from] RequestError),
    /// An existence check failed; the run aborts without alerting.
    #[error("existence check failed for producer {producer}: {source}")]
    Storage {
        /// Producer whose check failed.
        producer: String,
        /// Underlying storage failure.
        #[source]
        source: StorageError,
    },
    /// The alert could not be published.
    #[error("alert publication failed: {0}")]
    Alert(#[from] AlertError),
    /// A check task panicked or was cancelled.
    #[error("existence check task failed: {0}")]
    Task(String),
}

// ============================================================================
// SECTION: Settings And Report
// ============================================================================

/// Static configuration for the monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreshnessSettings {
    /// Producer home paths to check.
    pub producers: Vec<String>,
    /// Storage container holding producer homes.
    pub container: String,
    /// Topic that receives the alert.
    pub alert_topic: String,
    /// Bound on concurrent existence checks; zero is treated as one.
    pub max_concurrency: usize,
}

/// Outcome of one freshness run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreshnessReport {
    /// Checked date as `YYYY-MM-DD`.
    pub date: String,
    /// Number of distinct producers checked.
    pub checked: usize,
    /// Producers without a delivery, sorted.
    pub missing: Vec<String>,
    /// True when an alert was published.
    pub alerted: bool,
}

// ============================================================================
// SECTION: Existence Checks
// ============================================================================

/// Returns the producers with no object under their day prefix, sorted.
///
/// # Errors
///
/// Returns [`FreshnessError::Storage`] for the first failed check, or
/// [`FreshnessError::Task`] when a check task dies. Remaining checks are
/// cancelled in either case.
pub async fn find_missing(
    storage: &Arc<dyn ObjectStore>,
    query: &FreshnessQuery,
    max_concurrency: usize,
) -> Result<Vec<String>, FreshnessError> {
    let permits = Arc::new(Semaphore::new(max_concurrency.max(1)));
    let mut checks = JoinSet::new();
    for producer in query.producers() {
        let storage = Arc::clone(storage);
        let permits = Arc::clone(&permits);
        let container = query.container().to_string();
        let prefix = query.day_prefix(producer);
        let producer = producer.to_string();
        checks.spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(err) => return Err(FreshnessError::Task(err.to_string())),
            };
            match storage.list(&container, &prefix, 1).await {
                Ok(found) => Ok((producer, !found.is_empty())),
                Err(source) => Err(FreshnessError::Storage {
                    producer,
                    source,
                }),
            }
        });
    }

    let mut missing = Vec::new();
    while let Some(joined) = checks.join_next().await {
        let (producer, present) = joined.map_err(|err| FreshnessError::Task(err.to_string()))??;
        if !present {
            missing.push(producer);
        }
    }
    missing.sort();
    Ok(missing)
}

// ============================================================================
// SECTION: Monitor
// ============================================================================

/// Scheduled freshness check over a fixed producer list.
pub struct FreshnessMonitor {
    /// Producers, container, topic, and concurrency bound.
    settings: FreshnessSettings,
    /// Storage queried for deliveries.
    storage: Arc<dyn ObjectStore>,
    /// Channel receiving the alert.
    alerts: Arc<dyn AlertSink>,
    /// Event sink.
    log: Arc<dyn EventLog>,
}

impl FreshnessMonitor {
    /// Creates a monitor.
    #[must_use]
    pub fn new(
        settings: FreshnessSettings,
        storage: Arc<dyn ObjectStore>,
        alerts: Arc<dyn AlertSink>,
        log: Arc<dyn EventLog>,
    ) -> Self {
        Self {
            settings,
            storage,
            alerts,
            log,
        }
    }

    /// Checks today's deliveries (UTC).
    ///
    /// # Errors
    ///
    /// See [`FreshnessMonitor::run_for`].
    pub async fn run(&self) -> Result<FreshnessReport, FreshnessError> {
        self.run_for(OffsetDateTime::now_utc().date()).await
    }

    /// Checks deliveries for `date` and alerts once if any producer is missing.
    ///
    /// # Errors
    ///
    /// Returns [`FreshnessError`] when the query is invalid, a check fails,
    /// or the alert cannot be published.
    pub async fn run_for(&self, date: Date) -> Result<FreshnessReport, FreshnessError> {
        let query = FreshnessQuery::new(&self.settings.producers, &self.settings.container, date)?;
        let day = query.day().to_string();
        self.log.record(
            &LogEvent::new(COMPONENT, "freshness_started", LogLevel::Info, "freshness run started")
                .with_correlation(day.clone())
                .with_field("producers", query.len()),
        );

        let missing = match find_missing(&self.storage, &query, self.settings.max_concurrency).await {
            Ok(missing) => missing,
            Err(err) => {
                self.log.record(
                    &LogEvent::new(COMPONENT, "freshness_aborted", LogLevel::Error, err.to_string())
                        .with_correlation(day),
                );
                return Err(err);
            }
        };

        let alerted = match Alert::for_missing(&self.settings.alert_topic, &day, &missing) {
            Some(alert) => {
                self.alerts.publish(&alert).await?;
                self.log.record(
                    &LogEvent::new(COMPONENT, "freshness_alerted", LogLevel::Warn, alert.subject.clone())
                        .with_correlation(day.clone())
                        .with_field("missing", alert.missing.clone()),
                );
                true
            }
            None => {
                self.log.record(
                    &LogEvent::new(COMPONENT, "freshness_complete", LogLevel::Info, "all producers delivered")
                        .with_correlation(day.clone()),
                );
                false
            }
        };

        Ok(FreshnessReport {
            date: day,
            checked: query.len(),
            missing,
            alerted,
        })
    }
}
