//! Termination-signal listener that triggers the drain.
//!
//! [`init_shutdown`] is called once by the process entry point. It
//! spawns a dedicated OS thread running its own single-threaded tokio runtime,
//! registers SIGINT and SIGTERM (ctrl-c on non-unix targets), and only returns
//! once the handlers are in place. The first signal runs
//! [`ShutdownCoordinator::drain`] with [`DrainTrigger::Signal`] and, when
//! configured, exits the process after the drain completes.
//!
//! ```rust,ignore
//! let coordinator = Arc::new(ShutdownCoordinator::new());
//! let listener = init_shutdown(Arc::clone(&coordinator), &ShutdownConfig::default())?;
//! // ... run the program, handing `coordinator` to workers ...
//! coordinator.wait_jobs();
//! if let Some(listener) = listener {
//!     listener.stop();
//! }
//! ```

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{anyhow, Context};
use crossbeam_channel::Sender;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::config::ShutdownConfig;
use crate::core::{AppResult, DrainTrigger, ShutdownCoordinator};

const READY_TIMEOUT: Duration = Duration::from_secs(5);

type Ready = Sender<Result<(), String>>;

/// Handle to an installed listener.
///
/// Dropping the handle detaches the listener, which keeps running for the rest
/// of the process. Only [`stop`](Self::stop) ends it. Once registered, the
/// process keeps intercepting SIGINT and SIGTERM even after the listener stops,
/// so a stopped listener leaves those signals ignored.
#[derive(Debug)]
pub struct SignalListener {
    stop_tx: oneshot::Sender<()>,
    thread: JoinHandle<()>,
}

impl SignalListener {
    /// Stop listening and join the listener thread.
    ///
    /// If a signal already arrived this waits for the drain it started.
    pub fn stop(self) {
        let _ = self.stop_tx.send(());
        if self.thread.join().is_err() {
            warn!("signal listener thread panicked");
        }
    }

    /// Whether the listener thread has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }
}

/// Startup routine for the process entry point.
///
/// Installs the listener unless `config.install_signal_listener` is off, in
/// which case signals keep their default disposition and `None` is returned.
///
/// # Errors
///
/// Same as [`install_signal_listener`].
pub fn init_shutdown(
    coordinator: Arc<ShutdownCoordinator>,
    config: &ShutdownConfig,
) -> AppResult<Option<SignalListener>> {
    if !config.install_signal_listener {
        debug!("signal listener disabled by configuration");
        return Ok(None);
    }
    install_signal_listener(coordinator, config).map(Some)
}

/// Install the listener for `coordinator`, regardless of
/// `config.install_signal_listener`.
///
/// Keep the returned handle to [`stop`](SignalListener::stop) the listener
/// later; dropping it leaves the listener running.
///
/// # Errors
///
/// Fails when the thread, its runtime, or the signal handlers cannot be set up.
pub fn install_signal_listener(
    coordinator: Arc<ShutdownCoordinator>,
    config: &ShutdownConfig,
) -> AppResult<SignalListener> {
    let (stop_tx, stop_rx) = oneshot::channel();
    let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);
    let exit_code = config.exit_on_signal.then_some(config.exit_code);

    let thread = thread::Builder::new()
        .name("drain-signal".into())
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    let _ = ready_tx.send(Err(format!("failed to create listener runtime: {e}")));
                    return;
                }
            };

            let Some(signal) = rt.block_on(listen(ready_tx, stop_rx)) else {
                debug!("signal listener stopped");
                return;
            };

            info!(signal, "termination signal received, draining");
            coordinator.drain(DrainTrigger::Signal);

            if let Some(code) = exit_code {
                info!(code, "drain finished, exiting");
                std::process::exit(code);
            }
        })
        .context("failed to spawn signal listener thread")?;

    match ready_rx.recv_timeout(READY_TIMEOUT) {
        Ok(Ok(())) => {
            debug!("signal listener installed");
            Ok(SignalListener { stop_tx, thread })
        }
        Ok(Err(e)) => {
            let _ = thread.join();
            Err(anyhow!(e))
        }
        Err(e) => {
            let _ = stop_tx.send(());
            Err(anyhow!("signal listener did not become ready: {e}"))
        }
    }
}

/// Resolves to the signal name, or `None` when asked to stop.
#[cfg(unix)]
async fn listen(ready: Ready, stop: oneshot::Receiver<()>) -> Option<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let streams = signal(SignalKind::interrupt())
        .and_then(|interrupt| Ok((interrupt, signal(SignalKind::terminate())?)));
    let (mut interrupt, mut terminate) = match streams {
        Ok(streams) => streams,
        Err(e) => {
            let _ = ready.send(Err(format!("failed to register signal handlers: {e}")));
            return None;
        }
    };
    let _ = ready.send(Ok(()));

    tokio::select! {
        _ = interrupt.recv() => Some("SIGINT"),
        _ = terminate.recv() => Some("SIGTERM"),
        () = stop_requested(stop) => None,
    }
}

#[cfg(not(unix))]
async fn listen(ready: Ready, stop: oneshot::Receiver<()>) -> Option<&'static str> {
    let _ = ready.send(Ok(()));

    tokio::select! {
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => Some("ctrl-c"),
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                None
            }
        },
        () = stop_requested(stop) => None,
    }
}

/// Resolves on an explicit stop. A dropped handle never resolves it.
async fn stop_requested(stop: oneshot::Receiver<()>) {
    if stop.await.is_err() {
        debug!("signal listener handle dropped, listener detached");
        std::future::pending::<()>().await;
    }
}
