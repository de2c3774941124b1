//! Tests for scalar and keyed counters

use admission_drain::core::{Counter, KeyedCounter};

#[test]
fn test_keyed_inc_dec() {
    let counter = KeyedCounter::new();
    counter.inc("x");
    counter.inc("x");
    counter.inc("x");
    counter.dec("x");
    assert_eq!(counter.get("x"), 2);
}

#[test]
fn test_keyed_total() {
    let counter = KeyedCounter::new();
    counter.set("x", 2);
    counter.set("y", 5);
    assert_eq!(counter.total(), 7);
    assert_eq!(counter.map_size(), 2);
}

#[test]
fn test_map_copy_is_independent() {
    let counter = KeyedCounter::new();
    counter.set("x", 1);
    let mut copy = counter.map_copy();
    copy.insert("x".to_string(), 100);
    counter.inc("y");

    assert_eq!(counter.get("x"), 1);
    assert!(!copy.contains_key("y"));
}

#[test]
fn test_clone_is_independent() {
    let counter = KeyedCounter::new();
    counter.set("x", 1);
    let cloned = counter.clone();
    counter.inc("x");

    assert_eq!(cloned.get("x"), 1);
    assert_eq!(counter.get("x"), 2);
}

#[test]
fn test_scalar_counter() {
    let counter = Counter::new();
    counter.inc();
    counter.inc();
    counter.inc();
    counter.dec();
    assert_eq!(counter.get(), 2);
    counter.set(0);
    counter.dec();
    assert_eq!(counter.get(), -1);
}
