//! # Admission Drain
//!
//! Admission control and graceful-shutdown coordination for programs that act on
//! many independent resources at once (cluster nodes, cloud instances, remote
//! hosts) and must bound how much of that work runs while guaranteeing in-flight
//! operations finish before the process exits.
//!
//! The crate never looks at what the work is. It only decides how many units may
//! run, how many may wait, and what must be awaited at shutdown.
//!
//! ## Components
//!
//! - **[`AdmissionQueue`](core::AdmissionQueue)**: bounds accepted work
//!   (running + waiting) and, independently, executing work. `add` fails fast
//!   with `QueueFull` as backpressure; `start` parks until a concurrency slot
//!   frees.
//! - **[`ShutdownCoordinator`](core::ShutdownCoordinator)**: a one-shot drain.
//!   Tracks in-flight jobs and runs named early hooks before, and late hooks
//!   after, waiting for them. Triggered explicitly or by SIGINT/SIGTERM.
//! - **[`Counter`](core::Counter) / [`KeyedCounter`](core::KeyedCounter)**:
//!   lock-protected counters for reporting progress.
//!
//! The two primitives have no structural link; callers compose them around each
//! unit of work, or use [`runtime::run_admitted`] which does it for them.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use admission_drain::config::ShutdownConfig;
//! use admission_drain::core::{AdmissionQueue, ShutdownCoordinator};
//! use admission_drain::runtime::{init_shutdown, run_admitted};
//!
//! let coordinator = Arc::new(ShutdownCoordinator::new());
//! let _listener = init_shutdown(Arc::clone(&coordinator), &ShutdownConfig::default())?;
//!
//! coordinator.add_late_cleanup_job("close-log", |by_signal| flush_log(by_signal));
//!
//! let queue = AdmissionQueue::new(4, 16);
//! std::thread::scope(|scope| {
//!     for node in nodes {
//!         let (queue, coordinator) = (&queue, &*coordinator);
//!         scope.spawn(move || run_admitted(queue, Some(coordinator), || restart(node)));
//!     }
//! });
//!
//! coordinator.wait_jobs();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Admission control, drain coordination, and counters.
pub mod core;
/// Configuration models for admission pools and shutdown behavior.
pub mod config;
/// Builders to construct admission queues from configuration.
pub mod builders;
/// Signal listener and bounded-parallelism helpers.
pub mod runtime;
/// Shared utilities.
pub mod util;
