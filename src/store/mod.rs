pub mod disk;
pub mod memory;

use crate::core::cache::RateCache;
use crate::core::config::AppConfig;
use anyhow::Result;
use disk::DiskRateCache;
use memory::MemoryRateCache;
use std::sync::Arc;
use tracing::debug;

/// Picks the rate cache backend for the given configuration.
pub fn open_rate_cache(config: &AppConfig) -> Result<Arc<dyn RateCache>> {
    if !config.cache.enabled {
        debug!("Rate cache disabled, using in-memory store");
        return Ok(Arc::new(MemoryRateCache::new()));
    }
    let cache = DiskRateCache::new(config.cache_path()?);
    debug!("Using rate cache at {}", cache.path().display());
    Ok(Arc::new(cache))
}
