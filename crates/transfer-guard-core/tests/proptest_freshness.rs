// crates/transfer-guard-core/tests/proptest_freshness.rs
// ============================================================================
// Module: Freshness Property-Based Tests
// Description: Property tests for missing-set computation and alert gating.
// Purpose: The missing set is exactly the undelivered producers, alerted once.
// ============================================================================

//! Property-based tests for freshness invariants.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use common::FakeStore;
use common::RecordingAlerts;
use proptest::prelude::*;
use time::macros::date;
use transfer_guard_core::Alert;
use transfer_guard_core::FreshnessMonitor;
use transfer_guard_core::FreshnessSettings;
use transfer_guard_core::NoopEventLog;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread().enable_all().build().expect("runtime")
}

proptest! {
    #[test]
    fn missing_set_is_exactly_undelivered_producers(
        producers in prop::collection::btree_map("[a-z]{1,8}", any::<bool>(), 0 .. 16),
        max_concurrency in 1_usize .. 6,
    ) {
        let store = FakeStore::new();
        let alerts = RecordingAlerts::new();
        for (producer, delivered) in &producers {
            if *delivered {
                store.insert("landing", &format!("{producer}/2023-01-01/file.csv"), b"data");
            } else {
                store.insert("landing", &format!("{producer}/2022-12-31/file.csv"), b"old");
            }
        }
        let monitor = FreshnessMonitor::new(
            FreshnessSettings {
                producers: producers.keys().cloned().collect(),
                container: "landing".to_string(),
                alert_topic: "topic".to_string(),
                max_concurrency,
            },
            store.clone(),
            alerts.clone(),
            Arc::new(NoopEventLog),
        );

        let report = runtime().block_on(monitor.run_for(date!(2023 - 01 - 01))).unwrap();

        let expected: Vec<String> = producers
            .iter()
            .filter(|(_, delivered)| !**delivered)
            .map(|(producer, _)| producer.clone())
            .collect();
        prop_assert_eq!(&report.missing, &expected);
        prop_assert_eq!(alerts.count(), usize::from(!expected.is_empty()));
        prop_assert_eq!(report.alerted, !expected.is_empty());
    }

    #[test]
    fn alert_names_each_missing_producer_once(
        missing in prop::collection::vec("[a-z]{1,6}", 1 .. 12),
    ) {
        let alert = Alert::for_missing("topic", "2023-01-01", &missing).unwrap();
        let unique: BTreeSet<&String> = missing.iter().collect();
        let lines: Vec<&str> = alert.body.lines().skip(1).collect();
        prop_assert_eq!(lines.len(), unique.len());
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for line in &lines {
            *counts.entry(*line).or_default() += 1;
        }
        prop_assert!(counts.values().all(|count| *count == 1));
        prop_assert!(unique.iter().all(|producer| counts.contains_key(producer.as_str())));
    }
}
