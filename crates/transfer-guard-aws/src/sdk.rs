// crates/transfer-guard-aws/src/sdk.rs
// ============================================================================
// Module: SDK Bootstrap
// Description: Shared AWS SDK configuration loading.
// Purpose: Build every service client from one region/endpoint resolution.
// Dependencies: aws-config, transfer-guard-config
// ============================================================================

//! ## Overview
//! The SDK config is loaded once per process through the default provider
//! chain, with the region and endpoint overrides from [`AwsConfig`] applied.

use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_config::SdkConfig;
use transfer_guard_config::AwsConfig;

/// Loads the shared SDK configuration.
pub async fn load_sdk_config(config: &AwsConfig) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = &config.region {
        loader = loader.region(Region::new(region.clone()));
    }
    if let Some(endpoint) = &config.endpoint {
        loader = loader.endpoint_url(endpoint.trim());
    }
    loader.load().await
}
