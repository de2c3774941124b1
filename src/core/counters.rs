//! Lock-protected counters for reporting live concurrency and queue metrics.
//!
//! Each instance is serialized by one `parking_lot::Mutex`. Call rates are
//! low compared to the admission path, so there is no sharding.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde::{Serialize, Serializer};

/// Thread-safe scalar counter.
#[derive(Debug, Default)]
pub struct Counter {
    value: Mutex<i64>,
}

impl Counter {
    /// Create a counter starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one.
    pub fn inc(&self) {
        *self.value.lock() += 1;
    }

    /// Subtract one.
    pub fn dec(&self) {
        *self.value.lock() -= 1;
    }

    /// Current value.
    #[must_use]
    pub fn get(&self) -> i64 {
        *self.value.lock()
    }

    /// Overwrite the value.
    pub fn set(&self, value: i64) {
        *self.value.lock() = value;
    }
}

impl Clone for Counter {
    fn clone(&self) -> Self {
        Self {
            value: Mutex::new(self.get()),
        }
    }
}

impl Serialize for Counter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.get())
    }
}

/// Thread-safe string-keyed counters.
///
/// Missing keys read as zero; `inc`/`dec` create them on first use.
#[derive(Debug, Default)]
pub struct KeyedCounter {
    values: Mutex<HashMap<String, i64>>,
}

impl KeyedCounter {
    /// Create an empty keyed counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one to `key`.
    pub fn inc(&self, key: &str) {
        *self.values.lock().entry(key.to_owned()).or_insert(0) += 1;
    }

    /// Subtract one from `key`.
    pub fn dec(&self, key: &str) {
        *self.values.lock().entry(key.to_owned()).or_insert(0) -= 1;
    }

    /// Value of `key`, zero when absent.
    #[must_use]
    pub fn get(&self, key: &str) -> i64 {
        self.values.lock().get(key).copied().unwrap_or(0)
    }

    /// Overwrite the value of `key`.
    pub fn set(&self, key: &str, value: i64) {
        self.values.lock().insert(key.to_owned(), value);
    }

    /// All keys, in no particular order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.values.lock().keys().cloned().collect()
    }

    /// All values, in no particular order.
    #[must_use]
    pub fn values(&self) -> Vec<i64> {
        self.values.lock().values().copied().collect()
    }

    /// Sum of all values.
    #[must_use]
    pub fn total(&self) -> i64 {
        self.values.lock().values().sum()
    }

    /// Number of keys.
    #[must_use]
    pub fn map_size(&self) -> usize {
        self.values.lock().len()
    }

    /// Independent copy of the underlying map.
    #[must_use]
    pub fn map_copy(&self) -> HashMap<String, i64> {
        self.values.lock().clone()
    }
}

impl Clone for KeyedCounter {
    fn clone(&self) -> Self {
        Self {
            values: Mutex::new(self.map_copy()),
        }
    }
}

impl Serialize for KeyedCounter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.map_copy().serialize(serializer)
    }
}
