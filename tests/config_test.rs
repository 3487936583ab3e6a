//! Tests for config module

use std::io::Write;

use trendscope::config::Config;

#[test]
fn test_config_file_exists() {
    let config_path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("config.toml");
    assert!(
        config_path.exists(),
        "config.toml should exist in project root"
    );
}

#[test]
fn test_sample_config_matches_defaults() {
    let config_path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("config.toml");
    let config = Config::from_file(&config_path).expect("sample config should parse");
    let defaults = Config::default();

    assert!(config.validate().is_ok());
    assert_eq!(config.crawler.base_url, defaults.crawler.base_url);
    assert_eq!(config.crawler.max_depth, defaults.crawler.max_depth);
    assert_eq!(config.extraction.card_selector, defaults.extraction.card_selector);
    assert_eq!(config.trends.batch_size, defaults.trends.batch_size);
    assert_eq!(config.trends.recent_window_days, defaults.trends.recent_window_days);
}

#[test]
fn test_partial_file_uses_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[crawler]
max_depth = 1

[trends]
batch_size = 3
geo = "US"
"#
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.crawler.max_depth, 1);
    assert_eq!(config.crawler.start_path, "/trends/");
    assert_eq!(config.trends.batch_size, 3);
    assert_eq!(config.trends.geo, "US");
    assert_eq!(config.trends.max_retries, 3);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_invalid_values_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[trends]\nbatch_size = 0").unwrap();

    let config = Config::from_file(file.path()).unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("batch_size"));
}

#[test]
fn test_out_of_range_durations_rejected() {
    let mut config = Config::default();
    config.trends.recent_window_days = i64::MAX;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("recent_window_days"));

    let mut config = Config::default();
    config.trends.request_delay_secs = u64::MAX;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("request_delay_secs"));

    let mut config = Config::default();
    config.trends.recent_window_days = 3650;
    config.trends.request_delay_secs = 3600;
    config.trends.retry_delay_secs = 3600;
    assert!(config.validate().is_ok());
}

#[test]
fn test_malformed_toml_reports_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[crawler\nmax_depth = ").unwrap();

    let err = Config::from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse TOML config file"));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = Config::from_file(&dir.path().join("absent.toml"));
    assert!(result.is_err());
}
