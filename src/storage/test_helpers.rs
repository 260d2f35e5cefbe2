//! Shared test helpers for storage and admission tests.

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::address::NormalizedIp;
use crate::geoip::{is_china_region, now_millis, GeoVerdict};
use crate::storage::run_migrations;

/// Creates a test database pool with migrations applied.
///
/// Uses an in-memory database held on a single connection, so every query sees
/// the same schema and writers queue on the pool instead of hitting table locks.
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database pool");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// Builds a verdict stamped with the current time. Eligibility is derived from
/// `country_code`; the other location fields are left empty.
pub fn sample_verdict(ip: &str, country_code: &str, isp: &str, proxy: bool) -> GeoVerdict {
    GeoVerdict {
        ip: NormalizedIp::new(ip),
        country_code: country_code.to_string(),
        country: String::new(),
        region: String::new(),
        city: String::new(),
        isp: isp.to_string(),
        org: String::new(),
        is_proxy_flagged: proxy,
        is_china_region: is_china_region(country_code),
        last_updated: now_millis(),
    }
}
