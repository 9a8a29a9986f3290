//! Environment configuration
//!
//! These tests mutate the process environment, so they run serially.

use std::time::Duration;

use assert_matches::assert_matches;
use conduit::backend::server::{ConfigError, ServerConfig};
use serial_test::serial;

const VARS: [&str; 6] = [
    "ACCESS_SECRET",
    "CONDUIT_ADDR",
    "DATABASE_URL",
    "CONDUIT_ALLOW_INSECURE_SECRET",
    "CONDUIT_PONG_WAIT_SECS",
    "CONDUIT_OUTBOUND_CAPACITY",
];

fn clear_env() {
    for name in VARS {
        std::env::remove_var(name);
    }
}

#[test]
#[serial]
fn test_from_env_reads_process_environment() {
    clear_env();
    std::env::set_var("ACCESS_SECRET", "env-secret");
    std::env::set_var("CONDUIT_ADDR", "127.0.0.1:7070");
    std::env::set_var("CONDUIT_PONG_WAIT_SECS", "30");

    let config = ServerConfig::from_env().unwrap();
    assert_eq!(config.addr.port(), 7070);
    assert_eq!(config.access_secret, b"env-secret".to_vec());
    assert_eq!(config.connection.pong_wait, Duration::from_secs(30));
    assert_eq!(config.database_url, None);

    clear_env();
}

#[test]
#[serial]
fn test_from_env_requires_secret() {
    clear_env();
    assert_matches!(
        ServerConfig::from_env(),
        Err(ConfigError::Missing { name: "ACCESS_SECRET" })
    );

    std::env::set_var("ACCESS_SECRET", "s");
    std::env::set_var("CONDUIT_OUTBOUND_CAPACITY", "lots");
    assert_matches!(
        ServerConfig::from_env(),
        Err(ConfigError::Invalid { name: "CONDUIT_OUTBOUND_CAPACITY", .. })
    );

    clear_env();
}
