//! Bounded-parallelism helpers composed from [`AdmissionQueue`] and
//! [`ShutdownCoordinator`].
//!
//! [`run_admitted`] wraps one unit of work in the full protocol. The `*_limit`
//! helpers fan a batch out over scoped threads, one per item, with at most
//! `limit` of them running the closure at a time. They suit batches the size of
//! a cluster or a resource listing, not millions of items.

use std::panic;
use std::thread;

use crate::core::{AdmissionError, AdmissionQueue, ShutdownCoordinator};

/// Releases whatever slots it still holds, including while unwinding.
struct Admitted<'a> {
    queue: &'a AdmissionQueue,
    running: bool,
    admitted: bool,
}

impl<'a> Admitted<'a> {
    fn add(queue: &'a AdmissionQueue) -> Result<Self, AdmissionError> {
        queue.add()?;
        Ok(Self {
            queue,
            running: false,
            admitted: true,
        })
    }

    fn start(&mut self) {
        self.queue.start();
        self.running = true;
    }

    fn finish(mut self) -> Result<(), AdmissionError> {
        self.running = false;
        self.queue.end()?;
        self.admitted = false;
        self.queue.remove()
    }
}

impl Drop for Admitted<'_> {
    fn drop(&mut self) {
        if self.running {
            if let Err(e) = self.queue.end() {
                tracing::error!(error = %e, "failed to release concurrency slot");
            }
        }
        if self.admitted {
            if let Err(e) = self.queue.remove() {
                tracing::error!(error = %e, "failed to release admission slot");
            }
        }
    }
}

/// Run `work` under `queue`, optionally as an in-flight job of `coordinator`.
///
/// The job is tracked before `add` and finished after `remove`, so a drain
/// never misses admitted work. Slots are released even if `work` panics.
///
/// # Errors
///
/// [`AdmissionError::QueueFull`] without running `work` when the queue is
/// saturated; [`AdmissionError::QueueEmpty`] if another caller broke the
/// release protocol on the same queue.
pub fn run_admitted<T, F>(
    queue: &AdmissionQueue,
    coordinator: Option<&ShutdownCoordinator>,
    work: F,
) -> Result<T, AdmissionError>
where
    F: FnOnce() -> T,
{
    let _job = coordinator.map(ShutdownCoordinator::track_job);
    let mut admitted = Admitted::add(queue)?;
    admitted.start();
    let output = work();
    admitted.finish()?;
    Ok(output)
}

/// Apply `f` to every item with at most `limit` calls running at once.
///
/// Results come back in input order. A panic in `f` is propagated after the
/// remaining threads finish.
///
/// # Errors
///
/// Only on a broken release protocol, which this helper does not cause itself.
pub fn map_limit<I, T, R, F>(items: I, limit: usize, f: F) -> Result<Vec<R>, AdmissionError>
where
    I: IntoIterator<Item = T>,
    T: Send,
    R: Send,
    F: Fn(T) -> R + Sync,
{
    let items: Vec<T> = items.into_iter().collect();
    if items.is_empty() {
        return Ok(Vec::new());
    }
    let queue = AdmissionQueue::new(limit, items.len());

    thread::scope(|scope| {
        let handles: Vec<_> = items
            .into_iter()
            .map(|item| {
                let queue = &queue;
                let f = &f;
                scope.spawn(move || run_admitted(queue, None, || f(item)))
            })
            .collect();

        let mut joined = Vec::with_capacity(handles.len());
        let mut panicked = None;
        for handle in handles {
            match handle.join() {
                Ok(result) => joined.push(result),
                Err(payload) => {
                    panicked.get_or_insert(payload);
                }
            }
        }
        if let Some(payload) = panicked {
            panic::resume_unwind(payload);
        }
        joined.into_iter().collect()
    })
}

/// Run `f` on every item with at most `limit` calls running at once.
///
/// # Errors
///
/// Same as [`map_limit`].
pub fn for_each_limit<I, T, F>(items: I, limit: usize, f: F) -> Result<(), AdmissionError>
where
    I: IntoIterator<Item = T>,
    T: Send,
    F: Fn(T) + Sync,
{
    map_limit(items, limit, f).map(|_| ())
}
