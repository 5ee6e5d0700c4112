//! Rate snapshot persistence abstractions.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A timestamped table of exchange rates relative to one base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
    #[serde(rename = "base")]
    pub base_currency: String,
    pub rates: BTreeMap<String, f64>,
    #[serde(rename = "timestamp")]
    pub fetched_at: DateTime<Utc>,
}

impl RateSnapshot {
    pub fn new(
        base_currency: &str,
        rates: BTreeMap<String, f64>,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            base_currency: base_currency.to_uppercase(),
            rates,
            fetched_at,
        }
    }

    /// A snapshot is fresh while `now - fetched_at < max_age`.
    pub fn is_fresh(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        now - self.fetched_at < max_age
    }

    /// Checks that the table is non-empty and every rate is positive and finite.
    pub fn validate(&self) -> Result<()> {
        if self.rates.is_empty() {
            return Err(anyhow!("Rate table for {} is empty", self.base_currency));
        }
        if let Some((code, rate)) = self
            .rates
            .iter()
            .find(|(_, rate)| !(rate.is_finite() && **rate > 0.0))
        {
            return Err(anyhow!("Invalid rate for {}: {}", code, rate));
        }
        Ok(())
    }
}

/// Durable storage for the latest rate snapshot.
///
/// Loading never fails: a missing, corrupt or stale snapshot is simply absent.
/// Saving is best effort and swallows write errors.
#[async_trait]
pub trait RateCache: Send + Sync {
    async fn load(&self, max_age: Duration) -> Option<RateSnapshot>;
    async fn save(&self, snapshot: &RateSnapshot);
}
