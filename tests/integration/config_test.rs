//! Configuration loading from the process environment
//!
//! These tests mutate process-wide environment variables, so they run
//! serially.

use std::time::Duration;

use pulsechat::shared::{AppConfig, ConfigError, Environment};
use serial_test::serial;

const KEYS: [&str; 5] = [
    "JWT_SECRET",
    "PORT",
    "NODE_ENV",
    "IDLE_TIMEOUT_SECS",
    "PULSECHAT_CONFIG",
];

fn clear_env() {
    for key in KEYS {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_from_env_requires_jwt_secret() {
    clear_env();

    assert_eq!(
        AppConfig::from_env().unwrap_err(),
        ConfigError::MissingValue("JWT_SECRET")
    );
}

#[test]
#[serial]
fn test_from_env_reads_variables() {
    clear_env();
    std::env::set_var("JWT_SECRET", "from-env");
    std::env::set_var("PORT", "7070");
    std::env::set_var("NODE_ENV", "production");
    std::env::set_var("IDLE_TIMEOUT_SECS", "15");

    let config = AppConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.jwt_secret, "from-env");
    assert_eq!(config.port, 7070);
    assert_eq!(config.environment, Environment::Production);
    assert_eq!(config.idle_timeout, Duration::from_secs(15));
    assert!(config.allowed_origins().is_empty());
}

#[test]
#[serial]
fn test_from_env_rejects_bad_port() {
    clear_env();
    std::env::set_var("JWT_SECRET", "from-env");
    std::env::set_var("PORT", "not-a-port");

    let err = AppConfig::from_env().unwrap_err();
    clear_env();

    assert!(matches!(err, ConfigError::InvalidValue { key: "PORT", .. }));
}
