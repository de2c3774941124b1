//! Builders to construct admission queues from configuration.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{AdmissionConfig, CoordinationConfig};
use crate::core::{AdmissionError, AdmissionQueue};

/// Build one queue from validated limits.
///
/// # Errors
///
/// [`AdmissionError::InvalidConfig`] when the limits do not validate.
pub fn build_queue(cfg: &AdmissionConfig) -> Result<AdmissionQueue, AdmissionError> {
    cfg.validate().map_err(AdmissionError::InvalidConfig)?;
    Ok(AdmissionQueue::new(cfg.concurrency_limit, cfg.queue_limit))
}

/// Build one shared queue per configured pool.
///
/// # Errors
///
/// [`AdmissionError::InvalidConfig`] when any pool does not validate.
pub fn build_queues(
    cfg: &CoordinationConfig,
) -> Result<HashMap<String, Arc<AdmissionQueue>>, AdmissionError> {
    cfg.validate()
        .map_err(|e| AdmissionError::InvalidConfig(format!("config invalid: {e}")))?;

    let mut queues = HashMap::with_capacity(cfg.pools.len());
    for (name, pool_cfg) in &cfg.pools {
        let queue = build_queue(pool_cfg)?;
        tracing::debug!(
            pool = %name,
            concurrency_limit = queue.concurrency_limit(),
            queue_limit = queue.queue_limit(),
            "admission queue built"
        );
        queues.insert(name.clone(), Arc::new(queue));
    }

    Ok(queues)
}
