// crates/transfer-guard-core/src/validator/tests.rs
// ============================================================================
// Module: Isolation Validator Unit Tests
// Description: Unit tests for validator helpers and error rendering.
// Purpose: Pin probe name entropy and failure messages.
// Dependencies: transfer-guard-core
// ============================================================================

//! ## Overview
//! Behavioral checks against fake probes live in `tests/isolation_validator.rs`.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use std::collections::BTreeSet;

use super::*;

#[test]
fn probe_tokens_are_128_bit_hex() {
    let token = probe_token();
    assert_eq!(token.len(), 32);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn probe_tokens_do_not_repeat() {
    let tokens: BTreeSet<String> = (0 .. 256).map(|_| probe_token()).collect();
    assert_eq!(tokens.len(), 256);
}

#[test]
fn content_mismatch_message_names_key_and_offset() {
    let err = ValidationError::ContentMismatch {
        key: "home/abc".to_string(),
        expected_len: 32,
        actual_len: 32,
        first_difference: 4,
    };
    let message = err.to_string();
    assert!(message.starts_with("file content mismatch at home/abc"));
    assert!(message.contains("first difference at byte 4"));
}

#[test]
fn default_options_use_standard_probe_prefix() {
    let options = ValidatorOptions::default();
    assert_eq!(options.outside_prefix, DEFAULT_OUTSIDE_PREFIX);
    assert_eq!(options.settle, SettlePolicy::default());
}
