//! Counting semaphore built on `parking_lot` primitives.
//!
//! Blocks on acquire at capacity and never fails. Waiters sleep on a
//! `Condvar`; there is no polling.

use parking_lot::{Condvar, Mutex};

/// Fixed-capacity counting semaphore.
#[derive(Debug)]
pub struct Semaphore {
    capacity: usize,
    available: Mutex<usize>,
    released: Condvar,
}

impl Semaphore {
    /// Create a semaphore with `capacity` permits, all available.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            available: Mutex::new(capacity),
            released: Condvar::new(),
        }
    }

    /// Total permits.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits not currently held.
    #[must_use]
    pub fn available(&self) -> usize {
        *self.available.lock()
    }

    /// Take a permit, blocking until one is released if none is free.
    pub fn acquire(&self) {
        let mut available = self.available.lock();
        self.released.wait_while(&mut available, |free| *free == 0);
        *available -= 1;
    }

    /// Take a permit only if one is free right now.
    pub fn try_acquire(&self) -> bool {
        let mut available = self.available.lock();
        if *available == 0 {
            return false;
        }
        *available -= 1;
        true
    }

    /// Return a permit and wake one waiter.
    ///
    /// Releasing more permits than were acquired is ignored.
    pub fn release(&self) {
        let mut available = self.available.lock();
        if *available >= self.capacity {
            tracing::error!(capacity = self.capacity, "semaphore released above capacity");
            return;
        }
        *available += 1;
        drop(available);
        self.released.notify_one();
    }
}
