//! Fixed demonstration rates used when no live source is reachable.

use crate::core::currency::RateSource;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::BTreeMap;

const DEMO_BASE: &str = "RUB";

const DEMO_RATES: &[(&str, f64)] = &[
    ("USD", 0.011),
    ("EUR", 0.010),
    ("GBP", 0.0085),
    ("JPY", 1.65),
    ("CNY", 0.079),
    ("RUB", 1.0),
    ("CAD", 0.015),
    ("AUD", 0.016),
    ("CHF", 0.0095),
    ("INR", 0.92),
    ("BRL", 0.055),
    ("MXN", 0.18),
    ("UAH", 0.42),
    ("KZT", 5.15),
    ("BYN", 0.035),
];

#[derive(Debug, Default, Clone, Copy)]
pub struct DemoRateSource;

impl DemoRateSource {
    /// Demo rates relative to `base`, rebased from the RUB table when needed.
    pub fn rates_for(base: &str) -> Result<BTreeMap<String, f64>> {
        let base = base.to_uppercase();
        let base_rate = DEMO_RATES
            .iter()
            .find(|(code, _)| *code == base)
            .map(|(_, rate)| *rate)
            .ok_or_else(|| anyhow!("No demo rates available for base currency: {}", base))?;

        Ok(DEMO_RATES
            .iter()
            .map(|(code, rate)| {
                let rebased = if *code == base {
                    1.0
                } else if base == DEMO_BASE {
                    *rate
                } else {
                    rate / base_rate
                };
                (code.to_string(), rebased)
            })
            .collect())
    }
}

#[async_trait]
impl RateSource for DemoRateSource {
    async fn fetch_rates(&self, base: &str) -> Result<BTreeMap<String, f64>> {
        Self::rates_for(base)
    }
}
