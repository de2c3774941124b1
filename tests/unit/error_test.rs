//! Tests for error types

use admission_drain::core::AdmissionError;

#[test]
fn test_queue_full_error() {
    let err = AdmissionError::QueueFull { max_total: 5 };
    assert_eq!(format!("{}", err), "queue full: all 5 admission slots are taken");
    assert!(err.is_backpressure());
}

#[test]
fn test_queue_empty_error() {
    let err = AdmissionError::QueueEmpty;
    assert_eq!(format!("{}", err), "queue empty: nothing to release");
    assert!(!err.is_backpressure());
}

#[test]
fn test_invalid_config_error() {
    let err = AdmissionError::InvalidConfig("concurrency_limit must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: concurrency_limit must be greater than 0"
    );
}

#[test]
fn test_error_converts_to_anyhow() {
    let result: admission_drain::core::AppResult<()> = Err(AdmissionError::QueueEmpty.into());
    let err = result.unwrap_err();
    assert!(err.downcast_ref::<AdmissionError>().is_some());
}
