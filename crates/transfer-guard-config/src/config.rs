// crates/transfer-guard-config/src/config.rs
// ============================================================================
// Module: Transfer Guard Configuration
// Description: Configuration loading and validation for Transfer Guard.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: transfer-guard-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is read once at startup from an optional TOML file, then
//! overlaid with the deployment's environment variables. The result is
//! validated and handed to the handlers by reference; nothing re-reads it.
//! Missing or invalid configuration fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use transfer_guard_core::FreshnessSettings;
use transfer_guard_core::SettlePolicy;
use transfer_guard_core::ValidatorOptions;
use transfer_guard_core::freshness::DEFAULT_MAX_CONCURRENCY;
use transfer_guard_core::interfaces::DEFAULT_TRANSFER_PORT;
use transfer_guard_core::validator::DEFAULT_OUTSIDE_PREFIX;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename, used only when present.
const DEFAULT_CONFIG_NAME: &str = "transfer-guard.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "TRANSFER_GUARD_CONFIG";
/// Comma-separated producer home paths.
pub const HOME_DIRECTORIES_ENV_VAR: &str = "HOME_DIRECTORIES";
/// Storage container holding producer homes.
pub const BUCKET_NAME_ENV_VAR: &str = "BUCKET_NAME";
/// Alert topic identifier.
pub const ALERT_TOPIC_ENV_VAR: &str = "SNS_ALERT_TOPIC";
/// Cloud region.
pub const REGION_ENV_VAR: &str = "AWS_REGION";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of configured producers.
const MAX_PRODUCERS: usize = 10_000;
/// Maximum concurrency bound for existence checks.
const MAX_CONCURRENCY: usize = 256;
/// Default settle interval in milliseconds.
const DEFAULT_SETTLE_MS: u64 = 5_000;
/// Default cumulative wait cap in milliseconds.
const DEFAULT_MAX_WAIT_MS: u64 = 30_000;
/// Default initial retry backoff in milliseconds.
const DEFAULT_BACKOFF_MS: u64 = 1_000;
/// Default transfer connect timeout in milliseconds.
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;
/// Default cap on bytes read from one stored object.
pub const DEFAULT_MAX_OBJECT_BYTES: usize = 16 * 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Configuration Model
// ============================================================================

/// Transfer Guard process configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TransferGuardConfig {
    /// Cloud SDK settings.
    #[serde(default)]
    pub aws: AwsConfig,
    /// Freshness monitor settings.
    #[serde(default)]
    pub freshness: FreshnessConfig,
    /// Isolation validator settings.
    #[serde(default)]
    pub validation: ValidationConfig,
}

/// Cloud SDK settings shared by every adapter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AwsConfig {
    /// Region override (defaults to the SDK's provider chain).
    #[serde(default)]
    pub region: Option<String>,
    /// Endpoint override for S3-compatible or local stacks.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Force path-style bucket addressing.
    #[serde(default)]
    pub force_path_style: bool,
    /// Allow non-TLS endpoints (explicit opt-in).
    #[serde(default)]
    pub allow_http: bool,
    /// Upper bound on bytes read from one stored object.
    #[serde(default = "default_max_object_bytes")]
    pub max_object_bytes: usize,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: None,
            endpoint: None,
            force_path_style: false,
            allow_http: false,
            max_object_bytes: default_max_object_bytes(),
        }
    }
}

/// Freshness monitor settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FreshnessConfig {
    /// Producer home paths to check.
    #[serde(default)]
    pub producers: Vec<String>,
    /// Storage container holding producer homes.
    #[serde(default)]
    pub bucket: String,
    /// Topic that receives the alert.
    #[serde(default)]
    pub alert_topic: String,
    /// Bound on concurrent existence checks.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl Default for FreshnessConfig {
    fn default() -> Self {
        Self {
            producers: Vec::new(),
            bucket: String::new(),
            alert_topic: String::new(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

/// Isolation validator settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ValidationConfig {
    /// Wait before the first storage read, in milliseconds.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    /// Cap on cumulative read-back waiting, in milliseconds.
    #[serde(default = "default_max_wait_ms")]
    pub max_wait_ms: u64,
    /// Initial read-back retry delay, in milliseconds; zero disables retries.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
    /// Transfer port used when a request omits one.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Transfer connect and handshake timeout, in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Prefix under which isolation probes are written.
    #[serde(default = "default_outside_prefix")]
    pub outside_prefix: String,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            settle_ms: default_settle_ms(),
            max_wait_ms: default_max_wait_ms(),
            backoff_ms: default_backoff_ms(),
            port: default_port(),
            connect_timeout_ms: default_connect_timeout_ms(),
            outside_prefix: default_outside_prefix(),
        }
    }
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl TransferGuardConfig {
    /// Loads configuration using the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, |name| env::var(name).ok())
    }

    /// Loads configuration, resolving environment variables through `lookup`.
    ///
    /// An explicit path or `TRANSFER_GUARD_CONFIG` must name a readable file.
    /// The default `transfer-guard.toml` is read only when it exists; with no
    /// file at all the built-in defaults apply.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load_with_env<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match resolve_path(path, &lookup)? {
            Some(resolved) => Self::read_file(&resolved)?,
            None => Self::default(),
        };
        config.apply_env(&lookup);
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration text without environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses one config file under the size limit.
    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Overlays the deployment environment onto file values.
    fn apply_env<F>(&mut self, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(HOME_DIRECTORIES_ENV_VAR) {
            self.freshness.producers = if raw.trim().is_empty() {
                Vec::new()
            } else {
                raw.split(',').map(|entry| entry.trim().to_string()).collect()
            };
        }
        if let Some(bucket) = lookup(BUCKET_NAME_ENV_VAR) {
            self.freshness.bucket = bucket.trim().to_string();
        }
        if let Some(topic) = lookup(ALERT_TOPIC_ENV_VAR) {
            self.freshness.alert_topic = topic.trim().to_string();
        }
        if let Some(region) = lookup(REGION_ENV_VAR).filter(|region| !region.trim().is_empty()) {
            self.aws.region = Some(region.trim().to_string());
        }
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.aws.validate()?;
        self.freshness.validate()?;
        self.validation.validate()
    }

    /// Returns monitor settings, requiring a bucket and topic.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the bucket or topic is unset.
    pub fn freshness_settings(&self) -> Result<FreshnessSettings, ConfigError> {
        if self.freshness.bucket.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "freshness.bucket must be set (or {BUCKET_NAME_ENV_VAR})"
            )));
        }
        if self.freshness.alert_topic.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "freshness.alert_topic must be set (or {ALERT_TOPIC_ENV_VAR})"
            )));
        }
        Ok(FreshnessSettings {
            producers: self.freshness.producers.clone(),
            container: self.freshness.bucket.trim().to_string(),
            alert_topic: self.freshness.alert_topic.trim().to_string(),
            max_concurrency: self.freshness.max_concurrency,
        })
    }
}

impl AwsConfig {
    /// Validates SDK settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(region) = &self.region {
            if region.trim().is_empty() {
                return Err(ConfigError::Invalid("aws.region must be non-empty".to_string()));
            }
        }
        if let Some(endpoint) = &self.endpoint {
            let trimmed = endpoint.trim();
            if !(trimmed.starts_with("https://") || trimmed.starts_with("http://")) {
                return Err(ConfigError::Invalid(
                    "aws.endpoint must include http:// or https://".to_string(),
                ));
            }
            if trimmed.starts_with("http://") && !self.allow_http {
                return Err(ConfigError::Invalid(
                    "aws.endpoint uses http:// without allow_http".to_string(),
                ));
            }
        }
        if self.max_object_bytes == 0 {
            return Err(ConfigError::Invalid(
                "aws.max_object_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl FreshnessConfig {
    /// Validates freshness settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.producers.len() > MAX_PRODUCERS {
            return Err(ConfigError::Invalid("too many freshness producers".to_string()));
        }
        if self.producers.iter().any(|producer| producer.trim().trim_end_matches('/').is_empty()) {
            return Err(ConfigError::Invalid(
                "freshness.producers entries must be non-empty".to_string(),
            ));
        }
        if self.max_concurrency == 0 || self.max_concurrency > MAX_CONCURRENCY {
            return Err(ConfigError::Invalid(format!(
                "freshness.max_concurrency must be between 1 and {MAX_CONCURRENCY}"
            )));
        }
        Ok(())
    }
}

impl ValidationConfig {
    /// Validates validator settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.settle_ms > self.max_wait_ms {
            return Err(ConfigError::Invalid(
                "validation.settle_ms must not exceed validation.max_wait_ms".to_string(),
            ));
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid("validation.port must be greater than zero".to_string()));
        }
        if self.connect_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "validation.connect_timeout_ms must be greater than zero".to_string(),
            ));
        }
        let prefix = self.outside_prefix.trim().trim_matches('/');
        if prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "validation.outside_prefix must be non-empty".to_string(),
            ));
        }
        if prefix.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..") {
            return Err(ConfigError::Invalid(
                "validation.outside_prefix must not contain empty or relative segments".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the read-back wait policy.
    #[must_use]
    pub const fn settle_policy(&self) -> SettlePolicy {
        SettlePolicy {
            settle: Duration::from_millis(self.settle_ms),
            max_wait: Duration::from_millis(self.max_wait_ms),
            backoff: Duration::from_millis(self.backoff_ms),
        }
    }

    /// Returns the transfer connect timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Returns validator tunables.
    #[must_use]
    pub fn validator_options(&self) -> ValidatorOptions {
        ValidatorOptions {
            settle: self.settle_policy(),
            outside_prefix: self.outside_prefix.trim().trim_matches('/').to_string(),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI, environment, or the optional default.
fn resolve_path<F>(path: Option<&Path>, lookup: &F) -> Result<Option<PathBuf>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let explicit = match path {
        Some(path) => Some(path.to_path_buf()),
        None => lookup(CONFIG_ENV_VAR).filter(|value| !value.trim().is_empty()).map(PathBuf::from),
    };
    if let Some(explicit) = explicit {
        if explicit.to_string_lossy().len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(Some(explicit));
    }
    let default = PathBuf::from(DEFAULT_CONFIG_NAME);
    Ok(default.is_file().then_some(default))
}

/// Default per-object read cap.
const fn default_max_object_bytes() -> usize {
    DEFAULT_MAX_OBJECT_BYTES
}

/// Default bound on concurrent existence checks.
const fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

/// Default settle interval.
const fn default_settle_ms() -> u64 {
    DEFAULT_SETTLE_MS
}

/// Default cumulative wait cap.
const fn default_max_wait_ms() -> u64 {
    DEFAULT_MAX_WAIT_MS
}

/// Default initial retry backoff.
const fn default_backoff_ms() -> u64 {
    DEFAULT_BACKOFF_MS
}

/// Default transfer port.
const fn default_port() -> u16 {
    DEFAULT_TRANSFER_PORT
}

/// Default connect timeout.
const fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

/// Default isolation probe prefix.
fn default_outside_prefix() -> String {
    DEFAULT_OUTSIDE_PREFIX.to_string()
}
