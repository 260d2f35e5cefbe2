//! In-process verdict cache.
//!
//! Nothing survives a restart. Useful for embedding hosts that already keep their
//! own persistence, and for tests that should not touch SQLite.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use super::cache::VerdictCache;
use crate::address::NormalizedIp;
use crate::error_handling::DatabaseError;
use crate::geoip::GeoVerdict;

#[derive(Debug, Default)]
pub struct MemoryVerdictCache {
    entries: RwLock<HashMap<NormalizedIp, GeoVerdict>>,
}

impl MemoryVerdictCache {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave a half-written verdict (inserts
    // move a whole value), so a poisoned map is still usable.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<NormalizedIp, GeoVerdict>> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<NormalizedIp, GeoVerdict>> {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl VerdictCache for MemoryVerdictCache {
    async fn get(&self, ip: &NormalizedIp) -> Result<Option<GeoVerdict>, DatabaseError> {
        Ok(self.read().get(ip).cloned())
    }

    async fn put(&self, verdict: &GeoVerdict) -> Result<(), DatabaseError> {
        self.write().insert(verdict.ip.clone(), verdict.clone());
        Ok(())
    }

    async fn remove(&self, ip: &NormalizedIp) -> Result<bool, DatabaseError> {
        Ok(self.write().remove(ip).is_some())
    }

    async fn clear(&self) -> Result<u64, DatabaseError> {
        let mut entries = self.write();
        let removed = entries.len() as u64;
        entries.clear();
        Ok(removed)
    }

    async fn len(&self) -> Result<u64, DatabaseError> {
        Ok(self.read().len() as u64)
    }
}
