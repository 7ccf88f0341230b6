// crates/transfer-guard-aws/src/sns.rs
// ============================================================================
// Module: SNS Alert Sink
// Description: SNS-backed implementation of the alert channel.
// Purpose: Publish freshness alerts to a topic.
// Dependencies: aws-sdk-sns, transfer-guard-core
// ============================================================================

//! ## Overview
//! Publishes freshness alerts to an SNS topic.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sns::Client;
use aws_sdk_sns::error::DisplayErrorContext;
use transfer_guard_core::Alert;
use transfer_guard_core::AlertError;
use transfer_guard_core::AlertSink;

/// Publishes alerts to SNS topics.
#[derive(Clone)]
pub struct SnsAlertSink {
    /// SNS client handle.
    client: Client,
}

impl SnsAlertSink {
    /// Builds a sink from shared SDK config.
    #[must_use]
    pub fn new(shared: &SdkConfig) -> Self {
        Self {
            client: Client::new(shared),
        }
    }
}

#[async_trait]
impl AlertSink for SnsAlertSink {
    async fn publish(&self, alert: &Alert) -> Result<(), AlertError> {
        self.client
            .publish()
            .topic_arn(&alert.topic)
            .subject(&alert.subject)
            .message(&alert.body)
            .send()
            .await
            .map_err(|err| AlertError::Publish(DisplayErrorContext(&err).to_string()))?;
        Ok(())
    }
}
