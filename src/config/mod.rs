//! Configuration models for admission pools and shutdown behavior.

pub mod pool;

pub use pool::{AdmissionConfig, CoordinationConfig, ShutdownConfig, DEFAULT_POOL};
