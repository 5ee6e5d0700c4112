//! Currency conversion through a single base currency.

use crate::core::cache::{RateCache, RateSnapshot};
use crate::core::conversion::ConversionResult;
use crate::core::error::ConversionError;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, instrument, warn};

/// Default freshness window for cached rates.
pub const DEFAULT_MAX_AGE_HOURS: i64 = 24;

/// Number of currency codes listed when an unknown code is requested.
const AVAILABLE_SAMPLE: usize = 20;

/// Remote provider of exchange rates.
///
/// Rates are expressed as units of each currency per one unit of `base`.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_rates(&self, base: &str) -> Result<BTreeMap<String, f64>>;
}

/// Outcome of loading rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatesStatus {
    /// A fresh snapshot was read from the cache; the source was not contacted.
    FromCache,
    /// Rates were fetched from the source and written to the cache.
    FromSource,
    /// Neither cache nor source produced rates; prior state is untouched.
    Unavailable,
}

impl RatesStatus {
    pub fn is_loaded(&self) -> bool {
        !matches!(self, RatesStatus::Unavailable)
    }
}

/// The rates together with the time they were obtained.
///
/// Always replaced as a whole so readers never see a mix of two fetches.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RateTable {
    pub rates: BTreeMap<String, f64>,
    pub last_update: Option<DateTime<Utc>>,
}

pub struct CurrencyConverter {
    base_currency: String,
    source: Arc<dyn RateSource>,
    cache: Arc<dyn RateCache>,
    max_age: Duration,
    table: RwLock<Arc<RateTable>>,
}

impl CurrencyConverter {
    pub fn new(
        base_currency: &str,
        source: Arc<dyn RateSource>,
        cache: Arc<dyn RateCache>,
    ) -> Self {
        Self {
            base_currency: base_currency.to_uppercase(),
            source,
            cache,
            max_age: Duration::hours(DEFAULT_MAX_AGE_HOURS),
            table: RwLock::new(Arc::new(RateTable::default())),
        }
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    /// Loads rates, preferring a fresh cached snapshot over the remote source.
    #[instrument(name = "FetchRates", skip(self), fields(base = %self.base_currency))]
    pub async fn fetch_rates(&self) -> RatesStatus {
        if let Some(snapshot) = self.cache.load(self.max_age).await {
            match self.check_snapshot(&snapshot) {
                Ok(()) => {
                    info!(
                        "Using cached rates for {} currencies from {}",
                        snapshot.rates.len(),
                        snapshot.fetched_at
                    );
                    self.adopt(snapshot.rates, snapshot.fetched_at);
                    return RatesStatus::FromCache;
                }
                Err(e) => debug!("Ignoring cached snapshot: {}", e),
            }
        }

        self.fetch_from_source().await
    }

    /// Fetches from the source even when the cache is fresh.
    #[instrument(name = "RefreshRates", skip(self), fields(base = %self.base_currency))]
    pub async fn refresh_rates(&self) -> RatesStatus {
        self.fetch_from_source().await
    }

    async fn fetch_from_source(&self) -> RatesStatus {
        let rates = match self.source.fetch_rates(&self.base_currency).await {
            Ok(rates) => rates,
            Err(e) => {
                warn!("Failed to fetch rates for {}: {:#}", self.base_currency, e);
                return RatesStatus::Unavailable;
            }
        };

        let snapshot = RateSnapshot::new(&self.base_currency, rates, Utc::now());
        if let Err(e) = snapshot.validate() {
            warn!("Rejected malformed rates for {}: {}", self.base_currency, e);
            return RatesStatus::Unavailable;
        }

        self.adopt(snapshot.rates.clone(), snapshot.fetched_at);
        info!(
            "Fetched rates for {} currencies relative to {}",
            snapshot.rates.len(),
            self.base_currency
        );
        self.cache.save(&snapshot).await;
        RatesStatus::FromSource
    }

    /// Adopts an externally supplied rate table without touching the cache.
    pub fn load_rates(&self, snapshot: RateSnapshot) -> Result<()> {
        self.check_snapshot(&snapshot)?;
        self.adopt(snapshot.rates, snapshot.fetched_at);
        Ok(())
    }

    fn check_snapshot(&self, snapshot: &RateSnapshot) -> Result<()> {
        if snapshot.base_currency != self.base_currency {
            return Err(anyhow!(
                "Snapshot base {} does not match {}",
                snapshot.base_currency,
                self.base_currency
            ));
        }
        snapshot.validate()
    }

    fn adopt(&self, rates: BTreeMap<String, f64>, last_update: DateTime<Utc>) {
        let table = Arc::new(RateTable {
            rates,
            last_update: Some(last_update),
        });
        *self.table.write().unwrap_or_else(PoisonError::into_inner) = table;
    }

    /// Consistent view of the current rates and their update time.
    pub fn rate_table(&self) -> Arc<RateTable> {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.rate_table().last_update
    }

    pub fn available_currencies(&self) -> BTreeSet<String> {
        self.rate_table().rates.keys().cloned().collect()
    }

    pub fn convert(
        &self,
        from_currency: &str,
        to_currency: &str,
        amount: f64,
    ) -> Result<ConversionResult, ConversionError> {
        let table = self.rate_table();
        if table.rates.is_empty() {
            return Err(ConversionError::RatesNotLoaded);
        }
        if !amount.is_finite() {
            return Err(ConversionError::NonFiniteAmount(amount));
        }

        let from = from_currency.to_uppercase();
        let to = to_currency.to_uppercase();
        let from_rate = lookup_rate(&table.rates, &from)?;
        let to_rate = lookup_rate(&table.rates, &to)?;

        let (result, rate) = if from == self.base_currency {
            (amount * to_rate, to_rate)
        } else if to == self.base_currency {
            (amount / from_rate, 1.0 / from_rate)
        } else {
            let result = (amount / from_rate) * to_rate;
            // The ratio is undefined for a zero amount; report the target rate instead.
            let rate = if amount == 0.0 { to_rate } else { result / amount };
            (result, rate)
        };
        let result = ConversionError::check_result(result, amount, &from, &to)?;
        debug!("Converted {} {} -> {} {} at {}", amount, from, result, to, rate);

        Ok(ConversionResult::currency(amount, from, to, result, rate))
    }
}

fn lookup_rate(rates: &BTreeMap<String, f64>, code: &str) -> Result<f64, ConversionError> {
    rates
        .get(code)
        .copied()
        .ok_or_else(|| ConversionError::UnknownCurrency {
            code: code.to_string(),
            available: rates.keys().take(AVAILABLE_SAMPLE).cloned().collect(),
        })
}
