//! Configuration constants.
//!
//! This module defines the constants used throughout the gate: lookup timeouts,
//! the geolocation service contract, cache defaults, and the fixed region set.

use std::time::Duration;

/// Default SQLite database holding cached verdicts
pub const DB_PATH: &str = "./region_gate.db";

/// Default policy file (YAML)
pub const POLICY_PATH: &str = "./policy.yml";

// Geolocation service
/// Base URL of the geolocation service (`GET <base>/json/<ip>?lang=zh-CN`)
pub const DEFAULT_GEO_SERVICE_URL: &str = "http://ip-api.com";
/// Response language requested from the geolocation service.
/// Fixed for every call so cached display strings stay consistent.
pub const GEO_SERVICE_LANG: &str = "zh-CN";
/// Literal value of the `status` field on a successful lookup
pub const GEO_SUCCESS_STATUS: &str = "success";

// Network operation timeouts
/// TCP connect timeout for the geolocation service in milliseconds
pub const LOOKUP_CONNECT_TIMEOUT_MS: u64 = 5000;
/// Read timeout for the geolocation service in milliseconds
pub const LOOKUP_READ_TIMEOUT_MS: u64 = 5000;
/// Slack added on top of connect + read when bounding a whole lookup.
/// Covers request write and body decoding, which the per-phase timeouts do not.
pub const LOOKUP_TIMEOUT_SLACK: Duration = Duration::from_millis(500);

// Verdict cache
/// Default verdict TTL in seconds (7 days). `0` keeps verdicts forever.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Country codes eligible for admission. Fixed policy, not configuration.
pub const CHINA_REGION_CODES: &[&str] = &["CN", "HK", "MO", "TW"];

/// Message shown to rejected connections when the policy file does not set one
pub const DEFAULT_DENIED_MESSAGE: &str =
    "仅允许来自中国大陆的家庭用户连接。代理、VPN或非中国地区的IP地址已被拒绝。";

/// Default for `enable-region-restriction` when the policy file omits it
pub const DEFAULT_REGION_RESTRICTION_ENABLED: bool = true;

/// User-Agent sent to the geolocation service
pub const DEFAULT_USER_AGENT: &str = concat!("region_gate/", env!("CARGO_PKG_VERSION"));
