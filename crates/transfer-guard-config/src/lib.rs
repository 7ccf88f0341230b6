// crates/transfer-guard-config/src/lib.rs
// ============================================================================
// Module: Transfer Guard Config Library
// Description: Canonical process configuration and validation.
// Purpose: Single source of truth for transfer-guard.toml semantics.
// Dependencies: transfer-guard-core, serde, toml
// ============================================================================

//! ## Overview
//! `transfer-guard-config` defines the configuration model for Transfer Guard:
//! a TOML file overlaid with the deployment's environment variables, checked
//! with strict, fail-closed validation.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
