//! Admission decisions.
//!
//! One [`AdmissionDecider::decide`] call per connection attempt:
//! normalize the address, consult the verdict cache, look the address up on a miss,
//! store the fresh verdict, then evaluate it against a snapshot of the policy.
//!
//! Nothing escapes `decide`. A lookup failure is a deny, a cache read fault is a
//! miss, a cache write fault is logged and ignored.

mod blocking;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::address::NormalizedIp;
use crate::config::{Config, PolicyConfig, PolicyHandle};
use crate::error_handling::{
    CacheEvent, ConfigError, DecisionOutcome, DecisionStats, InitializationError,
};
use crate::geoip::{now_millis, GeoLookupClient, GeoVerdict};
use crate::policy::assess;
use crate::storage::{SqliteVerdictCache, VerdictCache};

pub use blocking::BlockingGate;

/// What the host does with a connection.
///
/// `reason_message` is the operator's configured denial text and is empty when the
/// connection is allowed. It never carries lookup or cache error detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionResult {
    pub allowed: bool,
    pub reason_message: String,
}

impl AdmissionResult {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason_message: String::new(),
        }
    }

    pub fn deny(message: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason_message: message.into(),
        }
    }
}

/// Where the verdict behind a decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictSource {
    Cache,
    Lookup,
}

impl VerdictSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictSource::Cache => "cache",
            VerdictSource::Lookup => "lookup",
        }
    }
}

/// A decision with the detail behind it, for operators and tooling.
#[derive(Debug, Clone)]
pub struct Decision {
    pub ip: NormalizedIp,
    pub outcome: DecisionOutcome,
    /// `None` when the lookup failed
    pub verdict: Option<GeoVerdict>,
    pub source: Option<VerdictSource>,
    pub result: AdmissionResult,
}

/// Decides whether connections from an address are admitted.
///
/// Cheap to clone and safe to share across tasks; every call runs independently
/// and the only shared state is the cache, the policy handle and the counters.
#[derive(Clone)]
pub struct AdmissionDecider {
    cache: Arc<dyn VerdictCache>,
    lookup: GeoLookupClient,
    policy: Arc<PolicyHandle>,
    cache_ttl: Option<Duration>,
    stats: Arc<DecisionStats>,
}

impl AdmissionDecider {
    /// Creates a decider whose cached verdicts never expire.
    pub fn new(cache: Arc<dyn VerdictCache>, lookup: GeoLookupClient, policy: PolicyConfig) -> Self {
        Self {
            cache,
            lookup,
            policy: Arc::new(PolicyHandle::new(policy)),
            cache_ttl: None,
            stats: Arc::new(DecisionStats::new()),
        }
    }

    /// Refresh cached verdicts older than `ttl`; `None` keeps them forever.
    pub fn with_cache_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Shares an existing policy handle, e.g. one that a file watcher also reloads.
    pub fn with_policy_handle(mut self, policy: Arc<PolicyHandle>) -> Self {
        self.policy = policy;
        self
    }

    /// Opens the SQLite cache at `config.db_path`, builds the lookup client, and
    /// applies `config`'s cache TTL.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated, or the HTTP
    /// client cannot be built.
    pub async fn from_config(
        config: &Config,
        policy: PolicyConfig,
    ) -> Result<Self, InitializationError> {
        let cache = SqliteVerdictCache::open(&config.db_path).await?;
        let lookup = GeoLookupClient::from_config(config).await?;
        info!(
            "Verdict cache at {} (TTL: {})",
            config.db_path.display(),
            describe_ttl(config.cache_ttl())
        );
        Ok(Self::new(Arc::new(cache), lookup, policy).with_cache_ttl(config.cache_ttl()))
    }

    /// Decides whether to admit a connection from `raw_ip`.
    pub async fn decide(&self, raw_ip: &str) -> AdmissionResult {
        self.decide_detailed(raw_ip).await.result
    }

    /// Like [`decide`](Self::decide), also reporting why and from which source.
    pub async fn decide_detailed(&self, raw_ip: &str) -> Decision {
        let ip = NormalizedIp::new(raw_ip);
        // One snapshot per decision; a concurrent reload only affects later calls
        let policy = self.policy.snapshot();

        let (verdict, source) = match self.cached_verdict(&ip).await {
            Some(verdict) => (verdict, VerdictSource::Cache),
            None => match self.lookup.lookup(&ip).await {
                Ok(verdict) => {
                    if self.cache.put(&verdict).await.is_err() {
                        self.stats.record_cache(CacheEvent::WriteFault);
                    }
                    (verdict, VerdictSource::Lookup)
                }
                Err(e) => {
                    warn!("Denying {}: {}", ip, e);
                    return self.finish(
                        ip,
                        DecisionOutcome::DeniedLookupFailure,
                        None,
                        None,
                        &policy,
                    );
                }
            },
        };

        let outcome = assess(&verdict, &policy);
        self.finish(ip, outcome, Some(verdict), Some(source), &policy)
    }

    async fn cached_verdict(&self, ip: &NormalizedIp) -> Option<GeoVerdict> {
        match self.cache.get(ip).await {
            Ok(Some(verdict)) => match self.cache_ttl {
                Some(ttl) if verdict.age(now_millis()) > ttl => {
                    debug!("Cached verdict for {} is older than {:?}, refreshing", ip, ttl);
                    self.stats.record_cache(CacheEvent::Expired);
                    None
                }
                _ => {
                    self.stats.record_cache(CacheEvent::Hit);
                    Some(verdict)
                }
            },
            Ok(None) => {
                self.stats.record_cache(CacheEvent::Miss);
                None
            }
            Err(_) => {
                self.stats.record_cache(CacheEvent::ReadFault);
                None
            }
        }
    }

    fn finish(
        &self,
        ip: NormalizedIp,
        outcome: DecisionOutcome,
        verdict: Option<GeoVerdict>,
        source: Option<VerdictSource>,
        policy: &PolicyConfig,
    ) -> Decision {
        self.stats.record_outcome(outcome);
        info!(
            "Admission for {} [{}]: {}",
            ip,
            source.map(|s| s.as_str()).unwrap_or("none"),
            outcome
        );

        let result = if outcome.is_allowed() {
            AdmissionResult::allow()
        } else {
            AdmissionResult::deny(policy.denied_message())
        };
        Decision {
            ip,
            outcome,
            verdict,
            source,
            result,
        }
    }

    /// Replaces the policy for decisions that start after this call.
    pub fn reload_policy(&self, policy: PolicyConfig) {
        self.policy.replace(policy);
    }

    /// Reloads the policy from a YAML file. On error the current policy stays.
    pub fn reload_policy_from(&self, path: &Path) -> Result<(), ConfigError> {
        self.policy.reload_from_file(path)
    }

    pub fn policy(&self) -> Arc<PolicyConfig> {
        self.policy.snapshot()
    }

    pub fn stats(&self) -> &Arc<DecisionStats> {
        &self.stats
    }

    pub fn cache(&self) -> &Arc<dyn VerdictCache> {
        &self.cache
    }
}

fn describe_ttl(ttl: Option<Duration>) -> String {
    match ttl {
        Some(ttl) => format!("{}s", ttl.as_secs()),
        None => "never expires".to_string(),
    }
}
