// crates/transfer-guard-cli/src/main.rs
// ============================================================================
// Module: Transfer Guard CLI
// Description: Command-line host for the lifecycle, freshness, and secret handlers.
// Purpose: Wire production adapters to the core handlers and report results as JSON.
// Dependencies: clap, serde_json, time, tokio, transfer-guard-{aws,config,core}
// ============================================================================

//! ## Overview
//! Each subcommand loads configuration, builds the AWS adapters, runs one
//! handler invocation, and writes a JSON result to stdout. Structured log
//! events go to stderr. A handler failure produces a non-zero exit code.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use serde::Serialize;
use thiserror::Error;
use time::Date;
use time::macros::format_description;
use transfer_guard_aws::Adapters;
use transfer_guard_config::TransferGuardConfig;
use transfer_guard_core::Credential;
use transfer_guard_core::EventLog;
use transfer_guard_core::FreshnessMonitor;
use transfer_guard_core::IsolationValidator;
use transfer_guard_core::LifecycleEvent;
use transfer_guard_core::LifecycleHandler;
use transfer_guard_core::LogLevel;
use transfer_guard_core::StderrEventLog;
use transfer_guard_core::ValidationRequest;
use transfer_guard_core::ValidationRequestParams;
use transfer_guard_core::sync_secret;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum size of a lifecycle event document.
const MAX_EVENT_BYTES: usize = 1024 * 1024;
/// Maximum size of a private key file.
const MAX_KEY_BYTES: usize = 64 * 1024;
/// Input path that selects stdin.
const STDIN_PATH: &str = "-";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Transfer Guard command-line interface.
#[derive(Parser, Debug)]
#[command(name = "transfer-guard", version, about = "Managed file-transfer guard handlers")]
struct Cli {
    /// Configuration file path (falls back to TRANSFER_GUARD_CONFIG).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Minimum severity written to the stderr event log.
    #[arg(long, global = true, value_enum, default_value_t = LogLevelArg::Info)]
    log_level: LogLevelArg,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Handle one Create/Update/Delete lifecycle event.
    Lifecycle(LifecycleCommand),
    /// Check that every producer delivered a file for the day.
    Freshness(FreshnessCommand),
    /// Run the isolation checks for one principal.
    Validate(ValidateCommand),
    /// Secret store commands.
    Secret {
        /// Selected secret subcommand.
        #[command(subcommand)]
        command: SecretCommand,
    },
}

/// Arguments for `lifecycle`.
#[derive(Args, Debug)]
struct LifecycleCommand {
    /// Event JSON file, or `-` for stdin.
    #[arg(long, value_name = "PATH", default_value = STDIN_PATH)]
    event: String,
}

/// Arguments for `freshness`.
#[derive(Args, Debug)]
struct FreshnessCommand {
    /// Day to check as YYYY-MM-DD; defaults to today (UTC).
    #[arg(long, value_name = "DATE")]
    date: Option<String>,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
struct ValidateCommand {
    /// Transfer principal (user name).
    #[arg(long)]
    principal: String,
    /// Secret holding the principal's private key.
    #[arg(long)]
    secret: String,
    /// Transfer endpoint host.
    #[arg(long)]
    host: String,
    /// Transfer endpoint port; defaults to the configured port.
    #[arg(long)]
    port: Option<u16>,
    /// Storage bucket behind the endpoint.
    #[arg(long)]
    bucket: String,
    /// Home folder the principal is confined to.
    #[arg(long)]
    home: String,
    /// Idempotency token echoed in the result.
    #[arg(long, default_value = "manual")]
    token: String,
}

/// Secret subcommands.
#[derive(Subcommand, Debug)]
enum SecretCommand {
    /// Create or update a secret from a file.
    Sync(SecretSyncCommand),
}

/// Arguments for `secret sync`.
#[derive(Args, Debug)]
struct SecretSyncCommand {
    /// Secret name.
    #[arg(long)]
    name: String,
    /// File holding the secret value, or `-` for stdin.
    #[arg(long, value_name = "PATH")]
    file: String,
}

/// Log level selector.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogLevelArg {
    /// Step-level detail.
    Debug,
    /// Normal progress.
    Info,
    /// Degraded runs and failures.
    Warn,
    /// Failures only.
    Error,
}

impl From<LogLevelArg> for LogLevel {
    fn from(value: LogLevelArg) -> Self {
        match value {
            LogLevelArg::Debug => Self::Debug,
            LogLevelArg::Info => Self::Info,
            LogLevelArg::Warn => Self::Warn,
            LogLevelArg::Error => Self::Error,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing failures.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Rendered error message.
    message: String,
}

impl CliError {
    /// Creates a new CLI error with the provided message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// Result alias for CLI operations.
type CliResult<T> = Result<T, CliError>;

/// Errors raised by bounded input reads.
#[derive(Debug, Error)]
enum ReadLimitError {
    /// The input could not be read.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// The input exceeds the size limit.
    #[error("input is {size} bytes, limit is {limit}")]
    TooLarge {
        /// Observed size in bytes.
        size: u64,
        /// Allowed size in bytes.
        limit: usize,
    },
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Parses arguments and dispatches the selected command.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let config = TransferGuardConfig::load(cli.config.as_deref())
        .map_err(|err| CliError::new(format!("config: {err}")))?;
    let log: Arc<dyn EventLog> = Arc::new(StderrEventLog::new(cli.log_level.into()));
    match cli.command {
        Commands::Lifecycle(command) => command_lifecycle(&command, &config, log).await,
        Commands::Freshness(command) => command_freshness(&command, &config, log).await,
        Commands::Validate(command) => command_validate(command, &config, log).await,
        Commands::Secret {
            command: SecretCommand::Sync(command),
        } => command_secret_sync(&command, &config).await,
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Builds the isolation validator from production adapters.
fn build_validator(
    adapters: &Adapters,
    config: &TransferGuardConfig,
    log: Arc<dyn EventLog>,
) -> IsolationValidator {
    IsolationValidator::new(
        Arc::clone(&adapters.secrets),
        Arc::clone(&adapters.storage),
        Arc::clone(&adapters.transfer),
        config.validation.validator_options(),
        log,
    )
}

/// Executes `lifecycle`.
async fn command_lifecycle(
    command: &LifecycleCommand,
    config: &TransferGuardConfig,
    log: Arc<dyn EventLog>,
) -> CliResult<ExitCode> {
    let bytes = read_input(&command.event, MAX_EVENT_BYTES)?;
    let event: LifecycleEvent = serde_json::from_slice(&bytes)
        .map_err(|err| CliError::new(format!("invalid lifecycle event: {err}")))?;
    let adapters = Adapters::from_config(config).await;
    let validator = build_validator(&adapters, config, Arc::clone(&log));
    let handler = LifecycleHandler::new(Arc::new(validator), log)
        .with_default_port(config.validation.port);
    let response = handler
        .handle(&event)
        .await
        .map_err(|err| CliError::new(format!("lifecycle: {err}")))?;
    write_json(&response)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `freshness`.
async fn command_freshness(
    command: &FreshnessCommand,
    config: &TransferGuardConfig,
    log: Arc<dyn EventLog>,
) -> CliResult<ExitCode> {
    let settings =
        config.freshness_settings().map_err(|err| CliError::new(format!("config: {err}")))?;
    let date = command.date.as_deref().map(parse_date).transpose()?;
    let adapters = Adapters::from_config(config).await;
    let monitor = FreshnessMonitor::new(settings, adapters.storage, adapters.alerts, log);
    let outcome = match date {
        Some(date) => monitor.run_for(date).await,
        None => monitor.run().await,
    };
    let report = outcome.map_err(|err| CliError::new(format!("freshness: {err}")))?;
    write_json(&report)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `validate`.
async fn command_validate(
    command: ValidateCommand,
    config: &TransferGuardConfig,
    log: Arc<dyn EventLog>,
) -> CliResult<ExitCode> {
    let request = ValidationRequest::new(ValidationRequestParams {
        principal: command.principal,
        credential_ref: command.secret,
        host: command.host,
        port: command.port.unwrap_or(config.validation.port),
        container: command.bucket,
        confined_root: command.home,
        idempotency_token: command.token,
    })
    .map_err(|err| CliError::new(format!("invalid request: {err}")))?;
    let adapters = Adapters::from_config(config).await;
    let result = build_validator(&adapters, config, log).run(&request).await;
    write_json(&result)?;
    Ok(if result.success { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Summary printed by `secret sync`.
#[derive(Serialize)]
struct SecretSyncSummary<'a> {
    /// Secret name.
    name: &'a str,
    /// `created` or `updated`.
    outcome: &'static str,
}

/// Executes `secret sync`.
async fn command_secret_sync(
    command: &SecretSyncCommand,
    config: &TransferGuardConfig,
) -> CliResult<ExitCode> {
    let bytes = read_input(&command.file, MAX_KEY_BYTES)?;
    let value = String::from_utf8(bytes)
        .map_err(|_| CliError::new(format!("{} is not valid UTF-8", command.file)))?;
    let adapters = Adapters::from_config(config).await;
    let outcome = sync_secret(&*adapters.secrets, &command.name, &Credential::new(value))
        .await
        .map_err(|err| CliError::new(format!("secret sync: {err}")))?;
    write_json(&SecretSyncSummary {
        name: &command.name,
        outcome: outcome.as_str(),
    })?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Input
// ============================================================================

/// Parses a `YYYY-MM-DD` date argument.
fn parse_date(value: &str) -> CliResult<Date> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|err| CliError::new(format!("invalid date {value}: {err}")))
}

/// Reads a file or stdin with a size limit.
fn read_input(source: &str, max_bytes: usize) -> CliResult<Vec<u8>> {
    let outcome = if source == STDIN_PATH {
        read_reader_with_limit(std::io::stdin().lock(), max_bytes)
    } else {
        read_bytes_with_limit(Path::new(source), max_bytes)
    };
    outcome.map_err(|err| CliError::new(format!("failed to read {source}: {err}")))
}

/// Reads a file, rejecting anything larger than `max_bytes`.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = std::fs::File::open(path)?;
    let size = file.metadata()?.len();
    if size > max_bytes as u64 {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    read_reader_with_limit(file, max_bytes)
}

/// Reads a stream, rejecting anything larger than `max_bytes`.
fn read_reader_with_limit<R: Read>(reader: R, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let mut bytes = Vec::new();
    reader.take(max_bytes as u64 + 1).read_to_end(&mut bytes)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: bytes.len() as u64,
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Output
// ============================================================================

/// Writes a value as one JSON line to stdout.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let payload = serde_json::to_string(value)
        .map_err(|err| CliError::new(format!("failed to render output: {err}")))?;
    write_stdout_line(&payload).map_err(|err| CliError::new(format!("stdout: {err}")))
}

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}

#[cfg(test)]
mod main_tests;
