//! Admission policy configuration.
//!
//! The policy is read from a small YAML file:
//!
//! ```yaml
//! denied-regions:
//!   - TW
//! enable-region-restriction: true
//! denied-message: "Connections from your region are not accepted."
//! ```
//!
//! A [`PolicyHandle`] holds the active policy behind an `ArcSwap`. Each decision takes
//! one snapshot and uses it to the end, so a reload never changes a decision that is
//! already running and never exposes a half-updated policy.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::constants::{DEFAULT_DENIED_MESSAGE, DEFAULT_REGION_RESTRICTION_ENABLED};
use crate::error_handling::ConfigError;

/// Immutable admission policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyConfig {
    denied_regions: HashSet<String>,
    region_restriction_enabled: bool,
    denied_message: String,
}

impl PolicyConfig {
    /// Builds a policy, normalizing the denied region list.
    ///
    /// Region codes are trimmed and uppercased; empty entries are dropped and
    /// duplicates collapse.
    pub fn new<I, S>(
        denied_regions: I,
        region_restriction_enabled: bool,
        denied_message: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            denied_regions: normalize_regions(denied_regions),
            region_restriction_enabled,
            denied_message: denied_message.into(),
        }
    }

    /// Uppercase two-letter codes excluded from admission.
    pub fn denied_regions(&self) -> &HashSet<String> {
        &self.denied_regions
    }

    /// Whether `denied_regions` is consulted at all.
    pub fn region_restriction_enabled(&self) -> bool {
        self.region_restriction_enabled
    }

    /// Message shown to rejected connections.
    pub fn denied_message(&self) -> &str {
        &self.denied_message
    }

    /// Case-insensitive membership test against the denied region list.
    pub fn is_region_denied(&self, country_code: &str) -> bool {
        self.denied_regions
            .contains(&country_code.trim().to_ascii_uppercase())
    }

    /// Reads and parses a policy file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parses a policy document.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to a struct with defaults
        if content.trim().is_empty() {
            return Ok(PolicyFile::default().into_policy());
        }
        let file: PolicyFile = serde_yaml::from_str(content)?;
        Ok(file.into_policy())
    }

    /// Loads a policy file, falling back to defaults when the file does not exist.
    ///
    /// A file that exists but cannot be parsed is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            warn!(
                "Policy file {} not found, using defaults (enable-region-restriction: {})",
                path.display(),
                DEFAULT_REGION_RESTRICTION_ENABLED
            );
            return Ok(Self::default());
        }
        Self::from_yaml_file(path)
    }

    /// Logs the effective policy.
    pub fn log_effective(&self) {
        let mut regions: Vec<&str> = self.denied_regions.iter().map(String::as_str).collect();
        regions.sort_unstable();
        info!(
            "Admission policy: region restriction {}, denied regions [{}]",
            if self.region_restriction_enabled {
                "enabled"
            } else {
                "disabled"
            },
            regions.join(", ")
        );
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::new(
            Vec::<String>::new(),
            DEFAULT_REGION_RESTRICTION_ENABLED,
            DEFAULT_DENIED_MESSAGE,
        )
    }
}

fn normalize_regions<I, S>(regions: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    regions
        .into_iter()
        .map(|r| r.as_ref().trim().to_ascii_uppercase())
        .filter(|r| !r.is_empty())
        .collect()
}

/// On-disk shape of the policy file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PolicyFile {
    #[serde(default)]
    pub denied_regions: Vec<Option<String>>,
    pub enable_region_restriction: Option<bool>,
    pub denied_message: Option<String>,
}

impl PolicyFile {
    /// Converts to a [`PolicyConfig`], applying defaults for missing keys.
    ///
    /// The restriction flag defaults differ between deployments, so an omitted
    /// flag is reported at `warn` level instead of being applied silently.
    pub fn into_policy(self) -> PolicyConfig {
        let enabled = match self.enable_region_restriction {
            Some(enabled) => enabled,
            None => {
                warn!(
                    "enable-region-restriction not set, defaulting to {}",
                    DEFAULT_REGION_RESTRICTION_ENABLED
                );
                DEFAULT_REGION_RESTRICTION_ENABLED
            }
        };
        PolicyConfig::new(
            self.denied_regions.into_iter().flatten(),
            enabled,
            self.denied_message
                .unwrap_or_else(|| DEFAULT_DENIED_MESSAGE.to_string()),
        )
    }
}

/// Shared, atomically replaceable policy.
#[derive(Debug)]
pub struct PolicyHandle {
    current: ArcSwap<PolicyConfig>,
}

impl PolicyHandle {
    pub fn new(policy: PolicyConfig) -> Self {
        Self {
            current: ArcSwap::from_pointee(policy),
        }
    }

    /// Returns the policy in effect right now.
    pub fn snapshot(&self) -> Arc<PolicyConfig> {
        self.current.load_full()
    }

    /// Replaces the whole policy. Decisions that already hold a snapshot keep it.
    pub fn replace(&self, policy: PolicyConfig) {
        policy.log_effective();
        self.current.store(Arc::new(policy));
    }

    /// Re-reads the policy file and swaps it in.
    ///
    /// On error the previous policy stays active.
    pub fn reload_from_file(&self, path: &Path) -> Result<(), ConfigError> {
        let policy = PolicyConfig::from_yaml_file(path)?;
        info!("Reloaded admission policy from {}", path.display());
        self.replace(policy);
        Ok(())
    }
}

impl Default for PolicyHandle {
    fn default() -> Self {
        Self::new(PolicyConfig::default())
    }
}
