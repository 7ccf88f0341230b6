// crates/transfer-guard-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Unit Tests
// Description: Argument parsing, bounded input, and date handling.
// Purpose: Keep the command surface stable without reaching AWS.
// Dependencies: clap, tempfile
// ============================================================================

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use std::io::Cursor;

use clap::CommandFactory;

use super::*;

#[test]
fn command_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn lifecycle_event_defaults_to_stdin() {
    let cli = Cli::try_parse_from(["transfer-guard", "lifecycle"]).unwrap();
    let Commands::Lifecycle(command) = cli.command else {
        panic!("expected lifecycle command");
    };
    assert_eq!(command.event, STDIN_PATH);
    assert_eq!(cli.log_level, LogLevelArg::Info);
    assert!(cli.config.is_none());
}

#[test]
fn global_flags_follow_the_subcommand() {
    let cli = Cli::try_parse_from([
        "transfer-guard",
        "freshness",
        "--date",
        "2024-03-09",
        "--config",
        "guard.toml",
        "--log-level",
        "warn",
    ])
    .unwrap();
    assert_eq!(cli.config, Some(PathBuf::from("guard.toml")));
    assert_eq!(cli.log_level, LogLevelArg::Warn);
    let Commands::Freshness(command) = cli.command else {
        panic!("expected freshness command");
    };
    assert_eq!(command.date.as_deref(), Some("2024-03-09"));
}

#[test]
fn validate_requires_principal_fields() {
    assert!(Cli::try_parse_from(["transfer-guard", "validate", "--principal", "acme"]).is_err());
    let cli = Cli::try_parse_from([
        "transfer-guard",
        "validate",
        "--principal",
        "acme",
        "--secret",
        "sftp/acme",
        "--host",
        "sftp.example.com",
        "--bucket",
        "landing",
        "--home",
        "acme",
    ])
    .unwrap();
    let Commands::Validate(command) = cli.command else {
        panic!("expected validate command");
    };
    assert_eq!(command.port, None);
    assert_eq!(command.token, "manual");
}

#[test]
fn secret_sync_parses_nested_subcommand() {
    let cli = Cli::try_parse_from([
        "transfer-guard",
        "secret",
        "sync",
        "--name",
        "sftp/acme",
        "--file",
        "acme.pem",
    ])
    .unwrap();
    let Commands::Secret {
        command: SecretCommand::Sync(command),
    } = cli.command
    else {
        panic!("expected secret sync command");
    };
    assert_eq!(command.name, "sftp/acme");
    assert_eq!(command.file, "acme.pem");
}

#[test]
fn parse_date_accepts_iso_days() {
    let date = parse_date("2023-07-04").unwrap();
    assert_eq!(date.year(), 2023);
    assert_eq!(u8::from(date.month()), 7);
    assert_eq!(date.day(), 4);
}

#[test]
fn parse_date_rejects_other_shapes() {
    assert!(parse_date("07/04/2023").is_err());
    assert!(parse_date("2023-02-30").is_err());
    assert!(parse_date("").is_err());
}

#[test]
fn read_bytes_with_limit_accepts_small_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("event.json");
    std::fs::write(&path, b"{}").unwrap();
    assert_eq!(read_bytes_with_limit(&path, 16).unwrap(), b"{}");
}

#[test]
fn read_bytes_with_limit_rejects_large_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("event.json");
    std::fs::write(&path, vec![b'x'; 32]).unwrap();
    let err = read_bytes_with_limit(&path, 16).unwrap_err();
    assert!(matches!(err, ReadLimitError::TooLarge { size: 32, limit: 16 }));
}

#[test]
fn read_bytes_with_limit_reports_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_bytes_with_limit(&dir.path().join("absent.json"), 16).unwrap_err();
    assert!(matches!(err, ReadLimitError::Io(_)));
}

#[test]
fn reader_limit_applies_without_metadata() {
    let accepted = read_reader_with_limit(Cursor::new(vec![b'k'; 16]), 16).unwrap();
    assert_eq!(accepted.len(), 16);
    let err = read_reader_with_limit(Cursor::new(vec![b'k'; 17]), 16).unwrap_err();
    assert!(matches!(err, ReadLimitError::TooLarge { size: 17, limit: 16 }));
}

#[test]
fn read_input_names_the_source_on_failure() {
    let err = read_input("/nonexistent/transfer-guard/event.json", 16).unwrap_err();
    assert!(err.to_string().contains("/nonexistent/transfer-guard/event.json"));
}

#[test]
fn log_level_argument_maps_onto_event_levels() {
    assert_eq!(LogLevel::from(LogLevelArg::Debug), LogLevel::Debug);
    assert_eq!(LogLevel::from(LogLevelArg::Error), LogLevel::Error);
}
