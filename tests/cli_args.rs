// tests/cli_args.rs

use std::path::PathBuf;

use clap::Parser;
use paladin::cli::{CliArgs, LogLevel};
use paladin::config::default_config_path;
use paladin::logging::parse_level_str;

#[test]
fn defaults_point_at_the_system_config() {
    let args = CliArgs::try_parse_from(["paladin"]).unwrap();
    assert_eq!(args.config, default_config_path());
    assert!(args.log_level.is_none());
    assert!(!args.dry_run);
}

#[test]
fn flags_override_defaults() {
    let args = CliArgs::try_parse_from([
        "paladin",
        "--config",
        "/tmp/test.conf",
        "--log-level",
        "debug",
        "--dry-run",
    ])
    .unwrap();

    assert_eq!(args.config, PathBuf::from("/tmp/test.conf"));
    assert!(matches!(args.log_level, Some(LogLevel::Debug)));
    assert!(args.dry_run);
}

#[test]
fn unknown_log_level_is_rejected() {
    assert!(CliArgs::try_parse_from(["paladin", "--log-level", "loud"]).is_err());
}

#[test]
fn env_level_strings_are_lenient() {
    assert_eq!(parse_level_str(" WARNING "), Some(tracing::Level::WARN));
    assert_eq!(parse_level_str("trace"), Some(tracing::Level::TRACE));
    assert_eq!(parse_level_str("verbose"), None);
}
