//! One-shot graceful-shutdown drain.
//!
//! A [`ShutdownCoordinator`] tracks in-flight jobs and two named registries of
//! cleanup hooks. The first call to [`ShutdownCoordinator::wait_jobs`] (or the
//! first termination signal, see [`crate::runtime::signal`]) starts the drain:
//!
//! 1. the coordinator flips to shutting-down and seals both registries;
//! 2. early hooks run, most recently registered first;
//! 3. the caller parks until the in-flight count reaches zero;
//! 4. late hooks run, most recently registered first.
//!
//! The transition is one-way. A sealed registry silently refuses further
//! registration and deletion, and any later `wait_jobs` caller parks until the
//! first drain has finished and then returns without running anything.
//!
//! The entry point owns exactly one coordinator and hands `Arc` clones to worker
//! code. Tests get a fresh coordinator per case instead of resetting one.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, error, info, warn};

/// Cleanup callback. Receives `true` when the drain was triggered by a signal.
pub type CleanupHook = Box<dyn FnOnce(bool) + Send + 'static>;

/// What started the drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainTrigger {
    /// Explicit call from the process, e.g. a fatal-error exit path.
    Explicit,
    /// Interrupt or termination signal.
    Signal,
}

impl DrainTrigger {
    /// Flag handed to every cleanup hook.
    #[must_use]
    pub const fn is_signal(self) -> bool {
        matches!(self, Self::Signal)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Running,
    Draining,
    Terminated,
}

/// Named hooks in registration order.
#[derive(Default)]
struct HookRegistry {
    hooks: Vec<(String, CleanupHook)>,
}

impl HookRegistry {
    /// Replaces in place when `name` exists, appends otherwise.
    fn insert(&mut self, name: String, hook: CleanupHook) {
        if let Some(slot) = self.hooks.iter_mut().find(|(existing, _)| *existing == name) {
            slot.1 = hook;
        } else {
            self.hooks.push((name, hook));
        }
    }

    fn delete(&mut self, name: &str) {
        self.hooks.retain(|(existing, _)| existing != name);
    }

    fn take(&mut self) -> Vec<(String, CleanupHook)> {
        std::mem::take(&mut self.hooks)
    }
}

#[derive(Default)]
struct Registries {
    early: HookRegistry,
    late: HookRegistry,
    sealed: bool,
}

/// Process-wide drain protocol for in-flight work and cleanup hooks.
pub struct ShutdownCoordinator {
    phase: Mutex<Phase>,
    phase_changed: Condvar,
    shutting_down: AtomicBool,
    registries: Mutex<Registries>,
    jobs: Mutex<usize>,
    jobs_done: Condvar,
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ShutdownCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShutdownCoordinator")
            .field("shutting_down", &self.is_shutting_down())
            .field("jobs", &self.job_count())
            .finish_non_exhaustive()
    }
}

impl ShutdownCoordinator {
    /// Create a coordinator in the running state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: Mutex::new(Phase::Running),
            phase_changed: Condvar::new(),
            shutting_down: AtomicBool::new(false),
            registries: Mutex::new(Registries::default()),
            jobs: Mutex::new(0),
            jobs_done: Condvar::new(),
        }
    }

    /// Whether the drain has begun. Never blocks.
    #[must_use]
    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Acquire)
    }

    /// Register one in-flight job. Pair with [`done_job`](Self::done_job).
    ///
    /// Never blocks, even while draining: a job added during the drain is
    /// waited for as well. A steady stream of overlapping jobs can therefore
    /// hold [`wait_jobs`](Self::wait_jobs) open indefinitely, so long-running
    /// producers should check [`is_shutting_down`](Self::is_shutting_down)
    /// before starting new work.
    pub fn add_job(&self) {
        let mut jobs = self.jobs.lock();
        *jobs += 1;
        if self.is_shutting_down() {
            debug!(jobs = *jobs, "job added while draining");
        }
    }

    /// Mark one in-flight job finished.
    ///
    /// Calling this without a matching [`add_job`](Self::add_job) is a caller
    /// bug; the count stays at zero.
    pub fn done_job(&self) {
        let mut jobs = self.jobs.lock();
        if *jobs == 0 {
            error!("done_job called with no jobs in flight");
            return;
        }
        *jobs -= 1;
        if *jobs == 0 {
            self.jobs_done.notify_all();
        }
    }

    /// Register a job and finish it when the guard drops.
    #[must_use = "the job is finished as soon as the guard is dropped"]
    pub fn track_job(&self) -> JobGuard<'_> {
        self.add_job();
        JobGuard { coordinator: self }
    }

    /// Jobs registered and not yet finished.
    #[must_use]
    pub fn job_count(&self) -> usize {
        *self.jobs.lock()
    }

    /// Register a hook to run before waiting for in-flight jobs.
    ///
    /// Re-registering a name replaces its hook. Ignored once draining.
    pub fn add_early_cleanup_job<F>(&self, name: impl Into<String>, hook: F)
    where
        F: FnOnce(bool) + Send + 'static,
    {
        self.register(Stage::Early, name.into(), Box::new(hook));
    }

    /// Register a hook to run after all in-flight jobs finished.
    ///
    /// Re-registering a name replaces its hook. Ignored once draining.
    pub fn add_late_cleanup_job<F>(&self, name: impl Into<String>, hook: F)
    where
        F: FnOnce(bool) + Send + 'static,
    {
        self.register(Stage::Late, name.into(), Box::new(hook));
    }

    /// Remove an early hook. No-op when absent or once draining.
    pub fn delete_early_cleanup_job(&self, name: &str) {
        self.deregister(Stage::Early, name);
    }

    /// Remove a late hook. No-op when absent or once draining.
    pub fn delete_late_cleanup_job(&self, name: &str) {
        self.deregister(Stage::Late, name);
    }

    /// Drain explicitly: run early hooks, wait for every in-flight job, run
    /// late hooks.
    ///
    /// Only the first caller drains. Later callers park until that drain is
    /// complete and return without running anything. Calling this from inside a
    /// cleanup hook deadlocks.
    pub fn wait_jobs(&self) {
        self.drain(DrainTrigger::Explicit);
    }

    /// Run the drain protocol, tagging hooks with `trigger`.
    pub fn drain(&self, trigger: DrainTrigger) {
        {
            let mut phase = self.phase.lock();
            if *phase != Phase::Running {
                debug!(?trigger, "drain already started, waiting for it to finish");
                self.phase_changed
                    .wait_while(&mut phase, |phase| *phase != Phase::Terminated);
                return;
            }
            *phase = Phase::Draining;
            self.shutting_down.store(true, Ordering::Release);
        }

        let (early, late) = {
            let mut registries = self.registries.lock();
            registries.sealed = true;
            (registries.early.take(), registries.late.take())
        };

        let is_signal = trigger.is_signal();
        info!(
            ?trigger,
            early_hooks = early.len(),
            late_hooks = late.len(),
            jobs = self.job_count(),
            "drain started"
        );

        run_hooks(Stage::Early, early, is_signal);

        {
            let mut jobs = self.jobs.lock();
            self.jobs_done.wait_while(&mut jobs, |jobs| *jobs > 0);
        }
        debug!("all in-flight jobs finished");

        run_hooks(Stage::Late, late, is_signal);

        *self.phase.lock() = Phase::Terminated;
        self.phase_changed.notify_all();
        info!(?trigger, "drain complete");
    }

    fn register(&self, stage: Stage, name: String, hook: CleanupHook) {
        let mut registries = self.registries.lock();
        if registries.sealed {
            warn!(%stage, name = %name, "cleanup hook ignored: already draining");
            return;
        }
        debug!(%stage, name = %name, "cleanup hook registered");
        registries.stage_mut(stage).insert(name, hook);
    }

    fn deregister(&self, stage: Stage, name: &str) {
        let mut registries = self.registries.lock();
        if registries.sealed {
            debug!(%stage, name, "cleanup hook deletion ignored: already draining");
            return;
        }
        registries.stage_mut(stage).delete(name);
    }
}

#[derive(Debug, Clone, Copy)]
enum Stage {
    Early,
    Late,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Early => "early",
            Self::Late => "late",
        })
    }
}

impl Registries {
    fn stage_mut(&mut self, stage: Stage) -> &mut HookRegistry {
        match stage {
            Stage::Early => &mut self.early,
            Stage::Late => &mut self.late,
        }
    }
}

/// Most recently registered first. A panicking hook is logged and skipped.
fn run_hooks(stage: Stage, hooks: Vec<(String, CleanupHook)>, is_signal: bool) {
    for (name, hook) in hooks.into_iter().rev() {
        debug!(%stage, name = %name, "running cleanup hook");
        if panic::catch_unwind(AssertUnwindSafe(move || hook(is_signal))).is_err() {
            error!(%stage, name = %name, "cleanup hook panicked");
        }
    }
}

/// Finishes its job on drop. Created by [`ShutdownCoordinator::track_job`].
#[derive(Debug)]
pub struct JobGuard<'a> {
    coordinator: &'a ShutdownCoordinator,
}

impl Drop for JobGuard<'_> {
    fn drop(&mut self) {
        self.coordinator.done_job();
    }
}
