//! region_gate library: connection admission by client geolocation
//!
//! Decides whether a connecting client may proceed based on where its address is
//! located and whether it looks like a proxy or VPN. Verdicts from the geolocation
//! service are cached in SQLite so an address is looked up once.
//!
//! # Example
//!
//! ```no_run
//! use region_gate::{AdmissionDecider, Config, PolicyConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let policy = PolicyConfig::load_or_default(&config.policy_file)?;
//! let decider = AdmissionDecider::from_config(&config, policy).await?;
//!
//! let result = decider.decide("::ffff:203.0.113.5").await;
//! if !result.allowed {
//!     println!("kick: {}", result.reason_message);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! `AdmissionDecider` needs a Tokio runtime. Hosts with a synchronous connection
//! hook use [`BlockingGate`], which owns one.

pub mod address;
pub mod admission;
pub mod config;
mod error_handling;
pub mod geoip;
pub mod initialization;
pub mod policy;
pub mod storage;

// Re-export public API
pub use address::{normalize_ip, NormalizedIp};
pub use admission::{AdmissionDecider, AdmissionResult, BlockingGate, Decision, VerdictSource};
pub use config::{Config, LogFormat, LogLevel, PolicyConfig, PolicyHandle};
pub use error_handling::{
    CacheEvent, ConfigError, DatabaseError, DecisionOutcome, DecisionStats, InitializationError,
    LookupFailure,
};
pub use geoip::{GeoLookupClient, GeoVerdict};
pub use storage::{run_migrations, MemoryVerdictCache, SqliteVerdictCache, VerdictCache};
