use std::fs;
use std::path::PathBuf;

use rangekeeper::error::{ConfigError, Error};
use rangekeeper::infrastructure::config::advisor::AdvisorBackend;
use rangekeeper::infrastructure::config::settings::Config;
use tempfile::TempDir;

fn write_temp_config(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, contents).expect("write temp config");
    path
}

fn example() -> String {
    fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.toml"))
        .expect("read example config")
}

#[test]
fn example_config_is_valid() {
    let config = Config::parse_toml(&example()).unwrap();

    assert_eq!(config.chain.chain_id, 31337);
    assert_eq!(config.chain.pool.decimals1, 6);
    assert_eq!(config.agent.poll_interval_secs, 15);
    assert_eq!(config.agent.process_interval_secs, 60);
    assert!(config.agent.dry_run);
    assert_eq!(config.advisor.backend, AdvisorBackend::Fallback);

    let key = config.chain.pool_key().unwrap();
    assert_eq!(key.tick_spacing, 60);
    assert_eq!(key.fee, 3000);
}

#[test]
fn config_loads_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write_temp_config(&dir, &example());

    let config = Config::load(&path).unwrap();
    assert_eq!(config.chain.rpc_url, "http://127.0.0.1:8545");
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = TempDir::new().unwrap();
    let result = Config::load(dir.path().join("absent.toml"));

    match result {
        Err(Error::Config(ConfigError::ReadFile(_))) => {}
        Err(err) => panic!("Expected read error, got {err}"),
        Ok(_) => panic!("Expected read error"),
    }
}

#[test]
fn config_rejects_zero_spacing() {
    let toml = example().replace("tick_spacing = 60", "tick_spacing = 0");

    match Config::parse_toml(&toml) {
        Err(Error::Config(ConfigError::InvalidValue {
            field: "tick_spacing",
            ..
        })) => {}
        Err(err) => panic!("Expected invalid spacing error, got {err}"),
        Ok(_) => panic!("Expected invalid spacing error"),
    }
}

#[test]
fn config_rejects_confidence_above_one_hundred() {
    let toml = example().replace("confidence_threshold = 60", "confidence_threshold = 101");

    assert!(matches!(
        Config::parse_toml(&toml),
        Err(Error::Config(ConfigError::InvalidValue {
            field: "confidence_threshold",
            ..
        }))
    ));
}

#[test]
fn config_rejects_zero_interval() {
    let toml = example().replace("poll_interval_secs = 15", "poll_interval_secs = 0");
    assert!(Config::parse_toml(&toml).is_err());
}

#[test]
fn malformed_toml_is_a_parse_error() {
    assert!(matches!(
        Config::parse_toml("[chain\nrpc_url = 1"),
        Err(Error::Config(ConfigError::Parse(_)))
    ));
}

#[test]
fn unknown_backend_is_rejected() {
    let toml = example().replace("backend = \"fallback\"", "backend = \"oracle\"");
    assert!(Config::parse_toml(&toml).is_err());
}
