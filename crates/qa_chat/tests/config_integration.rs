//! Integration tests for config load/save and the derived session settings.

use std::time::Duration;

use predicates::prelude::*;
use qa_chat::config::{self, DEFAULT_BASE_URL};
use qa_chat::{Config, ConfigError};

#[test]
fn load_existing_yaml_config() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");
    std::fs::write(
        &config_path,
        r#"
service:
  base_url: "https://qa.example.com/api"
  timeout_secs: 90
chat:
  greeting: "Ask me about the spend data."
"#,
    )
    .unwrap();

    let cfg = config::load(&config_path).expect("load should succeed");
    assert_eq!(cfg.base_url(), "https://qa.example.com/api");
    assert_eq!(cfg.request_timeout(), Some(Duration::from_secs(90)));
    assert_eq!(
        cfg.chat.greeting.as_deref(),
        Some("Ask me about the spend data.")
    );

    let options = cfg.session_options();
    assert_eq!(
        options.greeting.as_deref(),
        Some("Ask me about the spend data.")
    );
    assert_eq!(options.request_timeout, Some(Duration::from_secs(90)));
}

#[test]
fn empty_config_uses_defaults() {
    let cfg = Config::default();
    assert_eq!(cfg.base_url(), DEFAULT_BASE_URL);
    assert_eq!(cfg.request_timeout(), Some(Duration::from_secs(30)));
    assert!(cfg.session_options().greeting.is_none());
}

#[test]
fn zero_timeout_disables_the_limit() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");
    std::fs::write(&config_path, "service:\n  timeout_secs: 0\n").unwrap();

    let cfg = config::load(&config_path).expect("load should succeed");
    assert_eq!(cfg.request_timeout(), None);
    assert_eq!(cfg.base_url(), DEFAULT_BASE_URL);
}

#[test]
fn load_or_default_tolerates_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope").join("config.yaml");

    assert!(matches!(config::load(&missing), Err(ConfigError::Io { .. })));
    let cfg = config::load_or_default(&missing).expect("missing file should give defaults");
    assert_eq!(cfg, Config::default());
}

#[test]
fn invalid_yaml_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");
    std::fs::write(&config_path, "service: [not, a, mapping").unwrap();

    let err = config::load_or_default(&config_path).expect_err("broken yaml should fail");
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("config.yaml"));
}

#[test]
fn save_creates_directory_and_file_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("qa-chat");
    let config_path = config_dir.join("config.yaml");
    assert!(!config_dir.exists(), "config dir should not exist yet");

    let mut cfg = Config::default();
    cfg.service.base_url = Some("http://10.0.0.5:5000".into());
    cfg.service.timeout_secs = Some(10);
    cfg.chat.greeting = Some("Hi".into());

    config::save(&config_path, &cfg).expect("save should succeed");
    assert!(
        predicates::path::exists().eval(&config_path),
        "config file should exist after save"
    );

    let contents = std::fs::read_to_string(&config_path).unwrap();
    assert!(predicates::str::contains("service:").eval(&contents));
    assert!(predicates::str::contains("base_url").eval(&contents));
    assert!(
        predicates::str::contains("timeout_secs: 10").eval(&contents),
        "timeout should be saved"
    );

    let reloaded = config::load(&config_path).expect("reload should succeed");
    assert_eq!(reloaded, cfg);
}

/// Config path resolves to `~/.qa-chat/config.yaml` using the current platform's home dir.
#[test]
fn default_config_path_uses_home_directory() {
    let dir = tempfile::tempdir().unwrap();
    let home = dir.path().to_str().unwrap().to_string();

    let key = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    let original = std::env::var(key).ok();

    std::env::set_var(key, &home);
    let path = config::default_config_path();
    match original {
        Some(v) => std::env::set_var(key, v),
        None => std::env::remove_var(key),
    }

    let path = path.expect("should resolve a config path");
    let expected = dir.path().join(".qa-chat").join("config.yaml");
    assert_eq!(path, expected);
}

#[test]
fn base_url_env_overrides_file() {
    let mut cfg = Config::default();
    cfg.service.base_url = Some("http://from-file:5000".into());

    std::env::set_var(config::BASE_URL_ENV, "http://from-env:8080");
    cfg.apply_env();
    std::env::remove_var(config::BASE_URL_ENV);

    assert_eq!(cfg.base_url(), "http://from-env:8080");
}

#[test]
fn chat_section_only_carries_greeting() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");
    std::fs::write(&config_path, "chat:\n  greeting: Hello\n  scroll_threshold: 9\n").unwrap();

    let cfg = config::load(&config_path).expect("unknown keys are ignored");
    assert_eq!(cfg.chat.greeting.as_deref(), Some("Hello"));

    config::save(&config_path, &cfg).expect("save should succeed");
    let contents = std::fs::read_to_string(&config_path).unwrap();
    assert!(
        predicates::str::contains("scroll_threshold")
            .not()
            .eval(&contents),
        "unknown keys should not be written back"
    );
}
