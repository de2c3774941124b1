//! Process-level adapters: the signal listener and bounded-parallelism helpers.

pub mod parallel;
#[cfg(feature = "tokio-runtime")]
pub mod signal;

pub use parallel::{for_each_limit, map_limit, run_admitted};
#[cfg(feature = "tokio-runtime")]
pub use signal::{init_shutdown, install_signal_listener, SignalListener};
