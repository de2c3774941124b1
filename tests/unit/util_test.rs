//! Tests for utility functions

use admission_drain::util::init_tracing;

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
    tracing::info!("tracing initialized");
}
