// Unit tests for config load/save/validate.

use crate::config::BridgeConfig;
use crate::error::config::ConfigError;
use crate::DEFAULT_CONTROL_URL;

use tempfile::tempdir;

#[test]
fn given_missing_file_when_load_then_defaults() {
    let dir = tempdir().expect("tempdir");

    let config = BridgeConfig::load(dir.path()).expect("load defaults");

    assert_eq!(config.control.control_url, DEFAULT_CONTROL_URL);
    assert!(config.control.home_dir.is_none());
    assert!(config.logging.log_dir.is_none());
}

/// **VALUE**: Verifies save → load round-trips every field, through the
/// atomic temp-file path.
///
/// **WHY THIS MATTERS**: The config carries the control endpoint; losing or
/// mangling it on save points the bridge at nothing on next start.
#[test]
fn given_saved_config_when_load_then_roundtrips() {
    let dir = tempdir().expect("tempdir");

    let mut config = BridgeConfig::default();
    config.control.control_url = "wss://127.0.0.1:7890".to_string();
    config.control.home_dir = Some("/var/lib/tunnel".to_string());
    config.save(dir.path()).expect("save");

    let loaded = BridgeConfig::load(dir.path()).expect("load");
    assert_eq!(loaded.control.control_url, "wss://127.0.0.1:7890");
    assert_eq!(loaded.control.home_dir.as_deref(), Some("/var/lib/tunnel"));

    // No temp file left behind by the atomic rename
    assert!(!dir.path().join("bridge.json.tmp").exists());
}

#[test]
fn given_non_websocket_scheme_when_validate_then_validation_error() {
    let mut config = BridgeConfig::default();
    config.control.control_url = "http://127.0.0.1:9090".to_string();

    assert!(matches!(
        config.validate(),
        Err(ConfigError::Validation { .. })
    ));
}

#[test]
fn given_empty_home_dir_when_validate_then_validation_error() {
    let mut config = BridgeConfig::default();
    config.control.home_dir = Some(String::new());

    assert!(matches!(
        config.validate(),
        Err(ConfigError::Validation { .. })
    ));
}

#[test]
fn given_zero_version_when_validate_then_validation_error() {
    let mut config = BridgeConfig::default();
    config.version = 0;

    assert!(matches!(
        config.validate(),
        Err(ConfigError::Validation { .. })
    ));
}

/// **VALUE**: Verifies a corrupt file is a loud `Parse` error, not a silent
/// fall back to defaults.
///
/// **WHY THIS MATTERS**: Falling back would quietly redirect the bridge to
/// the default endpoint while the user believes their override is active.
#[test]
fn given_corrupt_file_when_load_then_parse_error() {
    let dir = tempdir().expect("tempdir");
    std::fs::write(dir.path().join("bridge.json"), "{not json").expect("write corrupt file");

    assert!(matches!(
        BridgeConfig::load(dir.path()),
        Err(ConfigError::Parse { .. })
    ));
}

#[test]
fn given_default_config_when_validate_then_ok() {
    BridgeConfig::default().validate().expect("defaults are valid");
    assert!(DEFAULT_CONTROL_URL.starts_with("ws://"));
}
