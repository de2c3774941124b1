//! Telemetry helpers for structured logging and tracing.

/// Initialize tracing. Callers can install their own subscriber first; this
/// helper installs an env-filtered `fmt` subscriber only if none is set.
///
/// Safe to call more than once.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
