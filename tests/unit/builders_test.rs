//! Tests for queue builders

use admission_drain::builders::{build_queue, build_queues};
use admission_drain::config::{AdmissionConfig, CoordinationConfig, ShutdownConfig};
use admission_drain::core::AdmissionError;
use std::collections::HashMap;

#[test]
fn test_build_queue() {
    let queue = build_queue(&AdmissionConfig {
        concurrency_limit: 3,
        queue_limit: 7,
    })
    .unwrap();
    assert_eq!(queue.concurrency_limit(), 3);
    assert_eq!(queue.max_total(), 10);
}

#[test]
fn test_build_queue_rejects_zero_concurrency() {
    let result = build_queue(&AdmissionConfig {
        concurrency_limit: 0,
        queue_limit: 7,
    });
    assert!(matches!(result, Err(AdmissionError::InvalidConfig(_))));
}

#[test]
fn test_build_queues_per_pool() {
    let cfg = CoordinationConfig {
        pools: HashMap::from([
            (
                "nodes".to_string(),
                AdmissionConfig {
                    concurrency_limit: 4,
                    queue_limit: 4,
                },
            ),
            (
                "clients".to_string(),
                AdmissionConfig {
                    concurrency_limit: 1,
                    queue_limit: 0,
                },
            ),
        ]),
        shutdown: ShutdownConfig::default(),
    };

    let queues = build_queues(&cfg).unwrap();
    assert_eq!(queues.len(), 2);
    assert_eq!(queues["nodes"].max_total(), 8);
    assert_eq!(queues["clients"].max_total(), 1);
}

#[test]
fn test_build_queues_empty_config() {
    let result = build_queues(&CoordinationConfig::default());
    assert!(matches!(result, Err(AdmissionError::InvalidConfig(_))));
}
