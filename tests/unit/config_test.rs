//! Tests for configuration validation

use admission_drain::config::{AdmissionConfig, CoordinationConfig, ShutdownConfig, DEFAULT_POOL};
use parking_lot::{const_mutex, Mutex, MutexGuard};
use std::collections::HashMap;
use std::env;

const ENV_VARS: [&str; 5] = [
    "ADMISSION_CONCURRENCY_LIMIT",
    "ADMISSION_QUEUE_LIMIT",
    "DRAIN_INSTALL_SIGNAL_LISTENER",
    "DRAIN_EXIT_ON_SIGNAL",
    "DRAIN_EXIT_CODE",
];

// The environment is process-global; tests touching it hold this lock.
static ENV_LOCK: Mutex<()> = const_mutex(());

/// Holds the env lock and clears the variables on both ends of a test.
struct EnvScope {
    _lock: MutexGuard<'static, ()>,
}

impl EnvScope {
    fn new(vars: &[(&str, &str)]) -> Self {
        let lock = ENV_LOCK.lock();
        clear_env();
        for (key, value) in vars {
            env::set_var(key, value);
        }
        Self { _lock: lock }
    }
}

impl Drop for EnvScope {
    fn drop(&mut self) {
        clear_env();
    }
}

fn clear_env() {
    for key in ENV_VARS {
        env::remove_var(key);
    }
}

fn pool(concurrency_limit: usize, queue_limit: usize) -> AdmissionConfig {
    AdmissionConfig {
        concurrency_limit,
        queue_limit,
    }
}

#[test]
fn test_admission_config_validation() {
    assert!(pool(4, 10).validate().is_ok());
    assert!(pool(1, 0).validate().is_ok());
}

#[test]
fn test_admission_config_invalid_concurrency() {
    assert!(pool(0, 10).validate().is_err());
}

#[test]
fn test_admission_config_overflow() {
    assert!(pool(usize::MAX, 1).validate().is_err());
}

#[test]
fn test_admission_config_default() {
    let cfg = AdmissionConfig::default();
    assert!(cfg.concurrency_limit >= 1);
    assert_eq!(cfg.queue_limit, 0);
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_shutdown_config_default() {
    let cfg = ShutdownConfig::default();
    assert!(cfg.install_signal_listener);
    assert!(cfg.exit_on_signal);
    assert_eq!(cfg.exit_code, 0);
}

#[test]
fn test_coordination_config_validation() {
    let config = CoordinationConfig {
        pools: HashMap::from([("nodes".to_string(), pool(8, 32))]),
        shutdown: ShutdownConfig::default(),
    };
    assert!(config.validate().is_ok());
}

#[test]
fn test_coordination_config_empty_pools() {
    let config = CoordinationConfig::default();
    assert!(config.validate().is_err());
}

#[test]
fn test_coordination_config_names_invalid_pool() {
    let config = CoordinationConfig {
        pools: HashMap::from([("broken".to_string(), pool(0, 1))]),
        shutdown: ShutdownConfig::default(),
    };
    let err = config.validate().unwrap_err();
    assert!(err.contains("pool `broken` invalid"));
}

#[test]
fn test_coordination_config_from_json() {
    let json = r#"{
        "pools": {
            "nodes": { "concurrency_limit": 4, "queue_limit": 12 },
            "volumes": { "concurrency_limit": 2 }
        },
        "shutdown": { "exit_on_signal": false, "exit_code": 130 }
    }"#;

    let config = CoordinationConfig::from_json_str(json).unwrap();
    assert_eq!(config.pools["nodes"], pool(4, 12));
    assert_eq!(config.pools["volumes"], pool(2, 0));
    assert!(!config.shutdown.exit_on_signal);
    assert!(config.shutdown.install_signal_listener);
    assert_eq!(config.shutdown.exit_code, 130);
}

#[test]
fn test_coordination_config_from_bad_json() {
    let err = CoordinationConfig::from_json_str("{ not json").unwrap_err();
    assert!(err.starts_with("parse error"));
}

#[test]
fn test_coordination_config_from_env() {
    let _env = EnvScope::new(&[
        ("ADMISSION_CONCURRENCY_LIMIT", "3"),
        ("ADMISSION_QUEUE_LIMIT", " 7 "),
        ("DRAIN_INSTALL_SIGNAL_LISTENER", "false"),
        ("DRAIN_EXIT_ON_SIGNAL", "false"),
        ("DRAIN_EXIT_CODE", "130"),
    ]);

    let config = CoordinationConfig::from_env().unwrap();
    assert_eq!(config.pools.len(), 1);
    assert_eq!(config.pools[DEFAULT_POOL], pool(3, 7));
    assert!(!config.shutdown.install_signal_listener);
    assert!(!config.shutdown.exit_on_signal);
    assert_eq!(config.shutdown.exit_code, 130);
}

#[test]
fn test_coordination_config_from_env_defaults() {
    let _env = EnvScope::new(&[]);

    let config = CoordinationConfig::from_env().unwrap();
    assert_eq!(config.pools[DEFAULT_POOL], AdmissionConfig::default());
    assert_eq!(config.shutdown, ShutdownConfig::default());
}

#[test]
fn test_coordination_config_from_env_bad_value() {
    let _env = EnvScope::new(&[("ADMISSION_QUEUE_LIMIT", "lots")]);

    let err = CoordinationConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("invalid value for ADMISSION_QUEUE_LIMIT"));
}

#[test]
fn test_coordination_config_from_env_rejects_zero_concurrency() {
    let _env = EnvScope::new(&[("ADMISSION_CONCURRENCY_LIMIT", "0")]);

    let err = CoordinationConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("pool `default` invalid"));
}
