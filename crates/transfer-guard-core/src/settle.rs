// crates/transfer-guard-core/src/settle.rs
// ============================================================================
// Module: Settle And Retry
// Description: Bounded wait-then-retry primitive for eventually consistent reads.
// Purpose: Never read before the settle interval, then back off up to a cap.
// Dependencies: tokio
// ============================================================================

//! ## Overview
//! Object storage behind the transfer endpoint is read-after-write eventually
//! consistent. [`settle_then_retry`] suspends for the settle interval before
//! the first attempt, then retries retryable failures with doubling backoff
//! until the cumulative wait would exceed `max_wait`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::time::Duration;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default settle interval before the first read.
pub const DEFAULT_SETTLE: Duration = Duration::from_secs(5);
/// Default cap on cumulative waiting.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(30);
/// Default initial backoff between retries.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Wait policy for consistency-lag compensation.
///
/// # Invariants
/// - The first attempt starts no earlier than `settle` after the call.
/// - Total sleeping never exceeds `max(settle, max_wait)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlePolicy {
    /// Minimum wait before the first attempt.
    pub settle: Duration,
    /// Cap on cumulative waiting, settle included.
    pub max_wait: Duration,
    /// Initial delay between retries; zero disables retries.
    pub backoff: Duration,
}

impl SettlePolicy {
    /// Policy that waits `settle` once and never retries.
    #[must_use]
    pub const fn fixed(settle: Duration) -> Self {
        Self {
            settle,
            max_wait: settle,
            backoff: Duration::ZERO,
        }
    }
}

impl Default for SettlePolicy {
    fn default() -> Self {
        Self {
            settle: DEFAULT_SETTLE,
            max_wait: DEFAULT_MAX_WAIT,
            backoff: DEFAULT_BACKOFF,
        }
    }
}

// ============================================================================
// SECTION: Primitives
// ============================================================================

/// Suspends for the policy's settle interval.
pub async fn settle(policy: &SettlePolicy) {
    tokio::time::sleep(policy.settle).await;
}

/// Waits the settle interval, then runs `attempt` until it succeeds, fails
/// with a non-retryable error, or the wait budget is spent.
///
/// # Errors
///
/// Returns the last error produced by `attempt`.
pub async fn settle_then_retry<T, E, F, Fut, R>(
    policy: &SettlePolicy,
    mut attempt: F,
    retryable: R,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
{
    settle(policy).await;
    let mut waited = policy.settle;
    let mut delay = policy.backoff;
    loop {
        let err = match attempt().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if delay.is_zero() || !retryable(&err) {
            return Err(err);
        }
        let next = waited.saturating_add(delay);
        if next > policy.max_wait {
            return Err(err);
        }
        tokio::time::sleep(delay).await;
        waited = next;
        delay = delay.saturating_mul(2);
    }
}
