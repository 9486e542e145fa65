//! Tests for configuration loading and graceful degradation
//!
//! - Missing TOML file falls back to defaults
//! - Malformed TOML is a configuration error
//! - API key priority: CLI, then EBIRDAPIKEY, then TOML
//!
//! Note: Uses serial_test so tests that set or clear EBIRDAPIKEY run
//! sequentially, not in parallel.

use ebrr_common::config::{
    resolve_api_key, resolve_reports_dir, LoggingConfig, TomlConfig, API_KEY_ENV_VAR,
    DEFAULT_REPORTS_DIR,
};
use ebrr_common::Error;
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_missing_config_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("does-not-exist.toml");

    let config = TomlConfig::load(&path).unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_full_config_file_parses() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("ebrr.toml");
    std::fs::write(
        &path,
        r#"
api_key = "secret"
checkpoint_path = "/var/tmp/checkpoint.dat"
reports_dir = "/var/tmp/reports"
requests_per_second = 2

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let config = TomlConfig::load(&path).unwrap();
    assert_eq!(config.api_key.as_deref(), Some("secret"));
    assert_eq!(
        config.checkpoint_path,
        Some(PathBuf::from("/var/tmp/checkpoint.dat"))
    );
    assert_eq!(config.requests_per_second, Some(2));
    assert_eq!(
        config.logging,
        LoggingConfig {
            level: Some("debug".to_string())
        }
    );
}

#[test]
fn test_malformed_config_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("ebrr.toml");
    std::fs::write(&path, "api_key = [unterminated").unwrap();

    let result = TomlConfig::load(&path);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_api_key_cli_wins_over_env_and_toml() {
    env::set_var(API_KEY_ENV_VAR, "env-key");
    let toml = TomlConfig {
        api_key: Some("toml-key".to_string()),
        ..Default::default()
    };

    assert_eq!(resolve_api_key(Some("cli-key"), &toml).unwrap(), "cli-key");
    assert_eq!(resolve_api_key(None, &toml).unwrap(), "env-key");
    env::remove_var(API_KEY_ENV_VAR);
}

#[test]
#[serial]
fn test_api_key_falls_back_to_toml() {
    env::remove_var(API_KEY_ENV_VAR);
    let toml = TomlConfig {
        api_key: Some("toml-key".to_string()),
        ..Default::default()
    };

    assert_eq!(resolve_api_key(None, &toml).unwrap(), "toml-key");
    // "0" is the placeholder value and never accepted
    assert_eq!(resolve_api_key(Some("0"), &toml).unwrap(), "toml-key");
}

#[test]
#[serial]
fn test_placeholder_env_key_is_skipped() {
    env::set_var(API_KEY_ENV_VAR, "0");
    let toml = TomlConfig {
        api_key: Some("toml-key".to_string()),
        ..Default::default()
    };

    assert_eq!(resolve_api_key(None, &toml).unwrap(), "toml-key");
    env::remove_var(API_KEY_ENV_VAR);
}

#[test]
#[serial]
fn test_missing_api_key_is_config_error() {
    env::remove_var(API_KEY_ENV_VAR);

    let result = resolve_api_key(None, &TomlConfig::default());
    match result {
        Err(Error::Config(msg)) => assert!(msg.contains(API_KEY_ENV_VAR)),
        other => panic!("expected config error, got {:?}", other),
    }
}

#[test]
fn test_reports_dir_default() {
    assert_eq!(
        resolve_reports_dir(None, &TomlConfig::default()),
        PathBuf::from(DEFAULT_REPORTS_DIR)
    );
}
