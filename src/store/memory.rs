use crate::core::cache::{RateCache, RateSnapshot};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Mutex;
use tracing::debug;

/// In-process rate cache holding at most one snapshot.
#[derive(Default)]
pub struct MemoryRateCache {
    slot: Mutex<Option<RateSnapshot>>,
}

impl MemoryRateCache {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_snapshot(snapshot: RateSnapshot) -> Self {
        Self {
            slot: Mutex::new(Some(snapshot)),
        }
    }
}

#[async_trait]
impl RateCache for MemoryRateCache {
    async fn load(&self, max_age: Duration) -> Option<RateSnapshot> {
        let slot = self.slot.lock().await;
        match slot.as_ref() {
            Some(snapshot) if snapshot.is_fresh(Utc::now(), max_age) => {
                debug!("Cache HIT for {} rates", snapshot.base_currency);
                Some(snapshot.clone())
            }
            Some(snapshot) => {
                debug!("Cache entry expired for {} rates", snapshot.base_currency);
                None
            }
            None => {
                debug!("Cache MISS");
                None
            }
        }
    }

    async fn save(&self, snapshot: &RateSnapshot) {
        let mut slot = self.slot.lock().await;
        debug!("Cache PUT for {} rates", snapshot.base_currency);
        *slot = Some(snapshot.clone());
    }
}
