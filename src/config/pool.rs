//! Admission and shutdown configuration structures.

use std::collections::HashMap;
use std::env;
use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::AppResult;

/// Name of the pool produced by [`CoordinationConfig::from_env`].
pub const DEFAULT_POOL: &str = "default";

/// Limits for one admission queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdmissionConfig {
    /// Maximum units running at once.
    pub concurrency_limit: usize,
    /// Maximum units waiting beyond the running ones.
    pub queue_limit: usize,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: num_cpus::get(),
            queue_limit: 0,
        }
    }
}

impl AdmissionConfig {
    /// Validate admission limits.
    pub fn validate(&self) -> Result<(), String> {
        if self.concurrency_limit == 0 {
            return Err("concurrency_limit must be greater than 0".into());
        }
        if self.concurrency_limit.checked_add(self.queue_limit).is_none() {
            return Err("concurrency_limit + queue_limit overflows".into());
        }
        Ok(())
    }
}

/// Drain and signal-listener behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// Whether `runtime::init_shutdown` installs the signal listener.
    pub install_signal_listener: bool,
    /// Exit the process once a signal-triggered drain completes.
    pub exit_on_signal: bool,
    /// Exit status used after a signal-triggered drain.
    pub exit_code: i32,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            install_signal_listener: true,
            exit_on_signal: true,
            exit_code: 0,
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinationConfig {
    /// Map of pool name to admission limits.
    pub pools: HashMap<String, AdmissionConfig>,
    /// Shutdown behavior.
    pub shutdown: ShutdownConfig,
}

impl CoordinationConfig {
    /// Validate all pools and ensure at least one pool exists.
    pub fn validate(&self) -> Result<(), String> {
        if self.pools.is_empty() {
            return Err("at least one pool must be defined".into());
        }
        for (name, pool) in &self.pools {
            pool.validate()
                .map_err(|e| format!("pool `{name}` invalid: {e}"))?;
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build a single-pool configuration from the environment.
    ///
    /// Loads `.env` when present, then reads `ADMISSION_CONCURRENCY_LIMIT`,
    /// `ADMISSION_QUEUE_LIMIT`, `DRAIN_INSTALL_SIGNAL_LISTENER`,
    /// `DRAIN_EXIT_ON_SIGNAL` and `DRAIN_EXIT_CODE`. Unset variables keep their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Fails when a variable does not parse or the result does not validate.
    pub fn from_env() -> AppResult<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }

        let mut pool = AdmissionConfig::default();
        if let Some(limit) = env_var("ADMISSION_CONCURRENCY_LIMIT")? {
            pool.concurrency_limit = limit;
        }
        if let Some(limit) = env_var("ADMISSION_QUEUE_LIMIT")? {
            pool.queue_limit = limit;
        }

        let mut shutdown = ShutdownConfig::default();
        if let Some(install) = env_var("DRAIN_INSTALL_SIGNAL_LISTENER")? {
            shutdown.install_signal_listener = install;
        }
        if let Some(exit) = env_var("DRAIN_EXIT_ON_SIGNAL")? {
            shutdown.exit_on_signal = exit;
        }
        if let Some(code) = env_var("DRAIN_EXIT_CODE")? {
            shutdown.exit_code = code;
        }

        let cfg = Self {
            pools: HashMap::from([(DEFAULT_POOL.to_owned(), pool)]),
            shutdown,
        };
        cfg.validate().map_err(anyhow::Error::msg)?;
        Ok(cfg)
    }
}

fn env_var<T>(key: &str) -> AppResult<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(e).with_context(|| format!("cannot read {key}")),
    }
}
