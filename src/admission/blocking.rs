//! Synchronous adapter for hosts whose connection hook cannot await.

use std::path::Path;

use tokio::runtime::{Builder, Runtime};

use super::{AdmissionDecider, AdmissionResult};
use crate::config::{Config, PolicyConfig};
use crate::error_handling::{ConfigError, InitializationError};

/// Wraps an [`AdmissionDecider`] together with the runtime that drives it.
///
/// `decide` blocks only the calling thread, for at most the lookup timeouts plus
/// a small constant. It can be called from many host threads at once. It must not
/// be called from inside another Tokio runtime.
pub struct BlockingGate {
    runtime: Runtime,
    decider: AdmissionDecider,
}

impl BlockingGate {
    pub fn new(runtime: Runtime, decider: AdmissionDecider) -> Self {
        Self { runtime, decider }
    }

    /// Starts a runtime and builds the decider from `config` on it.
    pub fn from_config(config: &Config, policy: PolicyConfig) -> Result<Self, InitializationError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("region-gate")
            .enable_all()
            .build()?;
        let decider = runtime.block_on(AdmissionDecider::from_config(config, policy))?;
        Ok(Self::new(runtime, decider))
    }

    pub fn decide(&self, raw_ip: &str) -> AdmissionResult {
        self.runtime.block_on(self.decider.decide(raw_ip))
    }

    pub fn reload_policy(&self, policy: PolicyConfig) {
        self.decider.reload_policy(policy);
    }

    pub fn reload_policy_from(&self, path: &Path) -> Result<(), ConfigError> {
        self.decider.reload_policy_from(path)
    }

    pub fn decider(&self) -> &AdmissionDecider {
        &self.decider
    }
}
