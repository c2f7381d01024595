//! Configuration tests
//!
//! This module contains tests for the configuration system.

use std::fs;

use viproxy::config::{PairConfig, ProxyConfig};
use viproxy::{Endpoint, ProxyError};

/// Test default configuration
#[test]
fn test_default_config() {
    let config = ProxyConfig::default();

    assert_eq!(config.log_level, None);
    assert_eq!(config.effective_log_level(), "info");
    assert!(config.pairs.is_empty());
}

/// Test configuration from file
#[test]
fn test_file_config() {
    let config_content = r#"{
        "log_level": "debug",
        "pairs": [
            { "in": "127.0.0.1:8080", "out": "3:8080" },
            { "in_addr": "16:9000", "out_addr": "127.0.0.1:9000" }
        ]
    }"#;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = dir.path().join("viproxy.json");
    fs::write(&config_path, config_content).expect("Failed to write test config file");

    let config = ProxyConfig::from_file(&config_path).expect("Failed to load config from file");

    assert_eq!(config.log_level.as_deref(), Some("debug"));
    assert_eq!(
        config.pairs,
        vec![
            PairConfig::new("127.0.0.1:8080", "3:8080"),
            PairConfig::new("16:9000", "127.0.0.1:9000"),
        ]
    );

    let pairs = config.forwarding_pairs().expect("Pairs should resolve");
    assert_eq!(pairs[0].outbound, Endpoint::vsock(3, 8080));
    assert_eq!(pairs[1].inbound, Endpoint::vsock(16, 9000));
}

/// Missing fields fall back to defaults
#[test]
fn test_partial_file_config() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("viproxy.json");
    fs::write(&config_path, r#"{ "pairs": [ { "in": "3:1", "out": "127.0.0.1:1" } ] }"#).unwrap();

    let config = ProxyConfig::from_file(&config_path).unwrap();
    assert_eq!(config.log_level, None);
    assert_eq!(config.effective_log_level(), "info");
    assert_eq!(config.pairs.len(), 1);
}

#[test]
fn test_file_config_errors() {
    let dir = tempfile::tempdir().unwrap();

    let missing = ProxyConfig::from_file(dir.path().join("missing.json"));
    assert!(matches!(missing, Err(ProxyError::Config(_))));

    let broken_path = dir.path().join("broken.json");
    fs::write(&broken_path, "{ not json").unwrap();
    let broken = ProxyConfig::from_file(&broken_path);
    assert!(matches!(broken, Err(ProxyError::Config(msg)) if msg.contains("broken.json")));
}

#[test]
fn test_args_config() {
    let config = ProxyConfig::from_args(Some("127.0.0.1:8080"), Some("3:8080"), Some("warn")).unwrap();
    assert_eq!(config.log_level.as_deref(), Some("warn"));
    assert_eq!(config.pairs, vec![PairConfig::new("127.0.0.1:8080", "3:8080")]);

    let config = ProxyConfig::from_args(None, None, None).unwrap();
    assert!(config.pairs.is_empty());
    assert_eq!(config.log_level, None);

    assert!(ProxyConfig::from_args(Some("127.0.0.1:8080"), None, None).is_err());
    assert!(ProxyConfig::from_args(None, Some("3:8080"), None).is_err());
}

/// Malformed addresses are configuration errors, never silently defaulted
#[test]
fn test_malformed_addresses_rejected() {
    for (in_addr, out_addr) in [
        ("127.0.0.1:8080", "3:8080:1"),
        ("3:notaport", "127.0.0.1:80"),
        ("99999999999:80", "127.0.0.1:80"),
    ] {
        let config = ProxyConfig::from_args(Some(in_addr), Some(out_addr), None).unwrap();
        assert!(
            matches!(config.validate(), Err(ProxyError::InvalidAddress { .. })),
            "{} -> {} should be rejected",
            in_addr,
            out_addr
        );
    }
}
