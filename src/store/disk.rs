use crate::core::cache::{RateCache, RateSnapshot};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const CACHE_FILE_NAME: &str = "exchange_rates_cache.json";

/// Rate cache persisted as a single JSON file.
pub struct DiskRateCache {
    path: PathBuf,
}

impl DiskRateCache {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<RateSnapshot> {
        let raw = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read cache file: {}", self.path.display()))?;
        let snapshot: RateSnapshot = serde_json::from_slice(&raw)
            .with_context(|| format!("Failed to parse cache file: {}", self.path.display()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    async fn write(&self, snapshot: &RateSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let body = serde_json::to_vec_pretty(snapshot)?;
        tokio::fs::write(&self.path, body)
            .await
            .with_context(|| format!("Failed to write cache file: {}", self.path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl RateCache for DiskRateCache {
    async fn load(&self, max_age: Duration) -> Option<RateSnapshot> {
        if !self.path.exists() {
            debug!("Cache MISS: {} does not exist", self.path.display());
            return None;
        }

        match self.read().await {
            Ok(snapshot) if snapshot.is_fresh(Utc::now(), max_age) => {
                debug!("Cache HIT for {} rates", snapshot.base_currency);
                Some(snapshot)
            }
            Ok(snapshot) => {
                debug!(
                    "Cache entry expired for {} rates fetched at {}",
                    snapshot.base_currency, snapshot.fetched_at
                );
                None
            }
            Err(e) => {
                warn!("Ignoring unusable rate cache: {:#}", e);
                None
            }
        }
    }

    async fn save(&self, snapshot: &RateSnapshot) {
        match self.write(snapshot).await {
            Ok(()) => debug!("Cache PUT to {}", self.path.display()),
            Err(e) => warn!("Failed to save rate cache: {:#}", e),
        }
    }
}
