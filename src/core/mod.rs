//! Admission control, drain coordination, and observability counters.

pub mod admission;
pub mod counters;
pub mod error;
pub mod semaphore;
pub mod shutdown;

pub use admission::{AdmissionQueue, QueueSize};
pub use counters::{Counter, KeyedCounter};
pub use error::{AdmissionError, AppResult};
pub use semaphore::Semaphore;
pub use shutdown::{CleanupHook, DrainTrigger, JobGuard, ShutdownCoordinator};
