/*!
 * Tests for application configuration
 */

use anyhow::Result;

use ncmlyrics::app_config::Config;
use ncmlyrics::lyric_document::MergeOptions;
use crate::common;

/// Test the built-in defaults
#[test]
fn test_default_config_shouldHaveExpectedValues() {
    let config = Config::default();

    assert!(config.merge_lyrics);
    assert_eq!(config.merge_window_ms, 20);
    assert!(config.outputs.is_empty());
    assert!(!config.exist_only);
    assert!(!config.overwrite);
    assert_eq!(config.api.timeout_secs, 30);
    assert_eq!(config.api.retry_count, 4);
    assert_eq!(config.api.retry_backoff_ms, 1000);
    assert!(config.validate().is_ok());
}

/// Test that a partial config file fills the rest with defaults
#[test]
fn test_parse_config_withPartialJson_shouldFillDefaults() -> Result<()> {
    let json = r#"{ "merge_window_ms": 75, "exist_only": true }"#;
    let config: Config = serde_json::from_str(json)?;

    assert_eq!(config.merge_window_ms, 75);
    assert!(config.exist_only);
    // Untouched fields keep their defaults
    assert!(config.merge_lyrics);
    assert_eq!(config.api.retry_count, 4);

    Ok(())
}

/// Test that unknown fields in the config file are rejected
#[test]
fn test_parse_config_withUnknownField_shouldFail() {
    let json = r#"{ "merge_window_ms": 75, "no_such_setting": 1 }"#;
    let result: std::result::Result<Config, _> = serde_json::from_str(json);

    assert!(result.is_err());
}

/// Test validation failure for a zero timeout
#[test]
fn test_validate_withZeroTimeout_shouldFail() {
    let mut config = Config::default();
    config.api.timeout_secs = 0;

    assert!(config.validate().is_err());
}

/// Test validation failure for a zero retry backoff
#[test]
fn test_validate_withZeroBackoff_shouldFail() {
    let mut config = Config::default();
    config.api.retry_backoff_ms = 0;

    assert!(config.validate().is_err());
}

/// Test validation failure for an absurdly wide merge window
#[test]
fn test_validate_withHugeMergeWindow_shouldFail() {
    let mut config = Config::default();
    config.merge_window_ms = 60_000;

    assert!(config.validate().is_err());
}

/// Test mapping the configuration onto merge options
#[test]
fn test_merge_options_withToggle_shouldMapOntoOptions() {
    let mut config = Config::default();
    config.merge_window_ms = 50;
    assert_eq!(config.merge_options(), MergeOptions::with_window(50));

    config.merge_lyrics = false;
    assert_eq!(config.merge_options(), MergeOptions::disabled());
}

/// Test round-tripping a config through a file on disk
#[test]
fn test_config_file_withRoundTrip_shouldPreserveValues() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;

    let mut config = Config::default();
    config.merge_window_ms = 35;
    config.overwrite = true;

    let path = temp_dir.path().join("config.json");
    std::fs::write(&path, serde_json::to_string_pretty(&config)?)?;

    let loaded: Config = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(loaded.merge_window_ms, 35);
    assert!(loaded.overwrite);
    assert_eq!(loaded.api, config.api);

    Ok(())
}

/// Test that an explicit cookie path wins over the platform default
#[test]
fn test_cookie_path_withExplicitSetting_shouldWin() {
    let mut config = Config::default();
    config.api.cookie_path = Some("/tmp/cookies.json".into());

    assert_eq!(
        config.api.get_cookie_path(),
        Some("/tmp/cookies.json".into())
    );
}
