//! Two-level admission control for parallel work.
//!
//! An [`AdmissionQueue`] bounds two things independently:
//!
//! - **admission slots** (`add`/`remove`): total accepted work, running plus
//!   waiting, capped at `concurrency_limit + queue_limit`;
//! - **concurrency slots** (`start`/`end`): work actually executing, capped at
//!   `concurrency_limit`.
//!
//! `add` is the backpressure boundary and fails fast with
//! [`AdmissionError::QueueFull`]. `start` never fails; it parks the caller until
//! a concurrency slot is free.
//!
//! The administrative lock over the counts and the concurrency [`Semaphore`] are
//! separate primitives and are never held together, so callers parked in
//! `start` do not serialize on the admission lock.
//!
//! ```
//! use admission_drain::core::AdmissionQueue;
//!
//! let queue = AdmissionQueue::new(2, 3);
//! queue.add()?;
//! queue.start();
//! // ... do the work ...
//! queue.end()?;
//! queue.remove()?;
//! # Ok::<(), admission_drain::core::AdmissionError>(())
//! ```

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::core::semaphore::Semaphore;
use crate::core::AdmissionError;

/// Point-in-time view of an [`AdmissionQueue`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSize {
    /// Holders of a concurrency slot.
    pub running: usize,
    /// Admitted but not yet running.
    pub waiting: usize,
}

impl QueueSize {
    /// Total admitted work (`running + waiting`).
    #[must_use]
    pub const fn queued(&self) -> usize {
        self.running + self.waiting
    }
}

/// Counts guarded by the administrative lock.
#[derive(Debug, Default)]
struct AdmissionState {
    queued: usize,
    running: usize,
}

/// Bounded admission plus bounded concurrency.
#[derive(Debug)]
pub struct AdmissionQueue {
    concurrency_limit: usize,
    queue_limit: usize,
    max_total: usize,
    state: Mutex<AdmissionState>,
    slots: Semaphore,
}

impl AdmissionQueue {
    /// Create a queue allowing `concurrency_limit` running and `queue_limit`
    /// additional waiting units.
    ///
    /// A `concurrency_limit` of zero would park every `start` forever, so it is
    /// raised to one. Use [`crate::builders::build_queue`] to reject it instead.
    /// The admission capacity saturates at `usize::MAX`.
    #[must_use]
    pub fn new(concurrency_limit: usize, queue_limit: usize) -> Self {
        let concurrency_limit = if concurrency_limit == 0 {
            tracing::warn!("concurrency limit of 0 raised to 1");
            1
        } else {
            concurrency_limit
        };
        Self {
            concurrency_limit,
            queue_limit,
            max_total: concurrency_limit.saturating_add(queue_limit),
            state: Mutex::new(AdmissionState::default()),
            slots: Semaphore::new(concurrency_limit),
        }
    }

    /// Maximum number of units running at once.
    #[must_use]
    pub const fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    /// Maximum number of units waiting beyond the running ones.
    #[must_use]
    pub const fn queue_limit(&self) -> usize {
        self.queue_limit
    }

    /// Total admission capacity.
    #[must_use]
    pub const fn max_total(&self) -> usize {
        self.max_total
    }

    /// Reserve an admission slot.
    ///
    /// # Errors
    ///
    /// [`AdmissionError::QueueFull`] when all `max_total` slots are taken.
    pub fn add(&self) -> Result<(), AdmissionError> {
        let mut state = self.state.lock();
        if state.queued >= self.max_total {
            tracing::warn!(
                queued = state.queued,
                max_total = self.max_total,
                "admission rejected: queue full"
            );
            return Err(AdmissionError::QueueFull {
                max_total: self.max_total,
            });
        }
        state.queued += 1;
        Ok(())
    }

    /// Take a concurrency slot, parking the caller until one is free.
    ///
    /// Must follow a successful [`add`](Self::add) for the same unit of work.
    pub fn start(&self) {
        self.slots.acquire();
        self.state.lock().running += 1;
    }

    /// Release a concurrency slot taken by [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// [`AdmissionError::QueueEmpty`] when no concurrency slot is held.
    pub fn end(&self) -> Result<(), AdmissionError> {
        {
            let mut state = self.state.lock();
            if state.running == 0 {
                tracing::error!("end called with no running work");
                return Err(AdmissionError::QueueEmpty);
            }
            state.running -= 1;
        }
        self.slots.release();
        Ok(())
    }

    /// Release an admission slot taken by [`add`](Self::add).
    ///
    /// # Errors
    ///
    /// [`AdmissionError::QueueEmpty`] when nothing is admitted.
    pub fn remove(&self) -> Result<(), AdmissionError> {
        let mut state = self.state.lock();
        if state.queued == 0 {
            tracing::error!("remove called on an empty queue");
            return Err(AdmissionError::QueueEmpty);
        }
        state.queued -= 1;
        Ok(())
    }

    /// Atomic snapshot of running and waiting work.
    ///
    /// `running + waiting` equals the admitted count as long as callers keep
    /// the `add`, `start`, `end`, `remove` order.
    #[must_use]
    pub fn size(&self) -> QueueSize {
        let state = self.state.lock();
        QueueSize {
            running: state.running,
            waiting: state.queued.saturating_sub(state.running),
        }
    }
}
