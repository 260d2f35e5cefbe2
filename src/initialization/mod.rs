//! Application initialization and resource setup.
//!
//! This module provides functions to initialize shared resources:
//! - HTTP client for geolocation lookups (with connect/read timeouts)
//! - Logger
//!
//! The database pool lives in `storage`.

mod client;
mod logger;

// Re-export public API
pub use client::init_client;
pub use logger::init_logger_with;
