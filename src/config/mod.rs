//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, service contract, region set)
//! - Library configuration and CLI option types
//! - The reloadable admission policy

mod constants;
mod policy;
mod types;

// Re-export all constants
pub use constants::*;
pub use policy::{PolicyConfig, PolicyFile, PolicyHandle};
pub use types::{CacheAction, Command, Config, GlobalOpts, LogFormat, LogLevel, Opt};
