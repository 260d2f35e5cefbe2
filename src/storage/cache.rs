//! Verdict cache.
//!
//! Maps a normalized address to its last verdict. `put` replaces the whole record
//! in a single upsert statement, so concurrent writers for the same address can
//! never leave a row mixing fields from two verdicts.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use log::{error, warn};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

use super::migrations::run_migrations;
use super::pool::init_db_pool_with_path;
use crate::address::NormalizedIp;
use crate::error_handling::DatabaseError;
use crate::geoip::GeoVerdict;

/// Storage for verdicts keyed by normalized address.
///
/// Implementations report faults as `DatabaseError`; the admission decider treats
/// a failed `get` as a miss and a failed `put` as a logged no-op.
#[async_trait]
pub trait VerdictCache: Send + Sync {
    /// Returns the stored verdict for `ip`, if any.
    async fn get(&self, ip: &NormalizedIp) -> Result<Option<GeoVerdict>, DatabaseError>;

    /// Inserts or replaces the verdict stored under `verdict.ip`.
    async fn put(&self, verdict: &GeoVerdict) -> Result<(), DatabaseError>;

    /// Deletes the verdict for `ip`. Returns whether one existed.
    async fn remove(&self, ip: &NormalizedIp) -> Result<bool, DatabaseError>;

    /// Deletes every verdict. Returns how many were removed.
    async fn clear(&self) -> Result<u64, DatabaseError>;

    /// Number of stored verdicts.
    async fn len(&self) -> Result<u64, DatabaseError>;
}

/// SQLite-backed verdict cache (table `ip_info`).
#[derive(Debug, Clone)]
pub struct SqliteVerdictCache {
    pool: Arc<Pool<Sqlite>>,
}

impl SqliteVerdictCache {
    /// Wraps an existing pool. The schema must already be migrated.
    pub fn new(pool: Arc<Pool<Sqlite>>) -> Self {
        Self { pool }
    }

    /// Opens (creating if needed) the database at `db_path` and applies migrations.
    pub async fn open(db_path: &Path) -> Result<Self, DatabaseError> {
        let pool = init_db_pool_with_path(db_path).await?;
        run_migrations(&pool).await.map_err(|e| {
            error!("Failed to run migrations on {}: {e}", db_path.display());
            e
        })?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

fn row_to_verdict(row: &SqliteRow) -> Result<GeoVerdict, DatabaseError> {
    let ip: String = row.try_get("ip")?;
    let last_updated_ms: i64 = row.try_get("last_updated")?;
    let last_updated =
        DateTime::from_timestamp_millis(last_updated_ms).ok_or_else(|| DatabaseError::CorruptRow {
            ip: ip.clone(),
            reason: format!("timestamp {} out of range", last_updated_ms),
        })?;

    Ok(GeoVerdict {
        ip: NormalizedIp::new(&ip),
        country_code: row.try_get("country_code")?,
        country: row.try_get("country")?,
        region: row.try_get("region")?,
        city: row.try_get("city")?,
        isp: row.try_get("isp")?,
        org: row.try_get("org")?,
        is_proxy_flagged: row.try_get("proxy")?,
        is_china_region: row.try_get("is_china_region")?,
        last_updated,
    })
}

#[async_trait]
impl VerdictCache for SqliteVerdictCache {
    async fn get(&self, ip: &NormalizedIp) -> Result<Option<GeoVerdict>, DatabaseError> {
        let row = sqlx::query(
            "SELECT ip, country_code, country, region, city, isp, org,
                    proxy, is_china_region, last_updated
             FROM ip_info WHERE ip = ?",
        )
        .bind(ip.as_str())
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| {
            warn!("Failed to read cached verdict for {}: {e}", ip);
            DatabaseError::SqlError(e)
        })?;

        match row {
            Some(row) => row_to_verdict(&row).map(Some).map_err(|e| {
                warn!("Ignoring unreadable cached verdict for {}: {e}", ip);
                e
            }),
            None => Ok(None),
        }
    }

    async fn put(&self, verdict: &GeoVerdict) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO ip_info (
                ip, country_code, country, region, city, isp, org,
                proxy, is_china_region, last_updated
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(ip) DO UPDATE SET
                country_code=excluded.country_code,
                country=excluded.country,
                region=excluded.region,
                city=excluded.city,
                isp=excluded.isp,
                org=excluded.org,
                proxy=excluded.proxy,
                is_china_region=excluded.is_china_region,
                last_updated=excluded.last_updated",
        )
        .bind(verdict.ip.as_str())
        .bind(&verdict.country_code)
        .bind(&verdict.country)
        .bind(&verdict.region)
        .bind(&verdict.city)
        .bind(&verdict.isp)
        .bind(&verdict.org)
        .bind(verdict.is_proxy_flagged)
        .bind(verdict.is_china_region)
        .bind(verdict.last_updated.timestamp_millis())
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| {
            warn!("Failed to cache verdict for {}: {e}", verdict.ip);
            DatabaseError::SqlError(e)
        })?;

        Ok(())
    }

    async fn remove(&self, ip: &NormalizedIp) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM ip_info WHERE ip = ?")
            .bind(ip.as_str())
            .execute(self.pool.as_ref())
            .await
            .map_err(|e| {
                warn!("Failed to remove cached verdict for {}: {e}", ip);
                DatabaseError::SqlError(e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM ip_info")
            .execute(self.pool.as_ref())
            .await
            .map_err(|e| {
                warn!("Failed to clear verdict cache: {e}");
                DatabaseError::SqlError(e)
            })?;
        Ok(result.rows_affected())
    }

    async fn len(&self) -> Result<u64, DatabaseError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ip_info")
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(|e| {
                warn!("Failed to count cached verdicts: {e}");
                DatabaseError::SqlError(e)
            })?;
        Ok(count.max(0) as u64)
    }
}
