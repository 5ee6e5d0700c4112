use super::ui;
use crate::core::config::AppConfig;
use crate::core::{CurrencyConverter, RateSnapshot, RatesStatus};
use crate::providers::{DemoRateSource, ExchangeRateApiProvider};
use crate::store;
use anyhow::{Result, bail};
use chrono::Utc;
use comfy_table::Cell;
use std::sync::Arc;
use tracing::{info, warn};

/// Where the converter's rates ended up coming from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatesOrigin {
    Live(RatesStatus),
    Demo,
    Missing,
}

impl RatesOrigin {
    pub fn is_available(&self) -> bool {
        !matches!(self, RatesOrigin::Missing)
    }
}

pub fn build_converter(config: &AppConfig) -> Result<CurrencyConverter> {
    let exchangerate = &config.providers.exchangerate;
    let source = Arc::new(ExchangeRateApiProvider::new(
        &exchangerate.base_url,
        exchangerate.api_key.as_deref(),
    ));
    let cache = store::open_rate_cache(config)?;
    let max_age = config.cache.max_age()?;
    Ok(CurrencyConverter::new(&config.base_currency, source, cache).with_max_age(max_age))
}

/// Loads rates into the converter, falling back to demo rates when allowed.
pub async fn load_rates(
    converter: &CurrencyConverter,
    config: &AppConfig,
    refresh: bool,
) -> RatesOrigin {
    let pb = ui::new_spinner("Fetching exchange rates...");
    let status = if refresh {
        converter.refresh_rates().await
    } else {
        converter.fetch_rates().await
    };
    pb.finish_and_clear();

    if status.is_loaded() {
        return RatesOrigin::Live(status);
    }

    if !config.demo_fallback {
        println!(
            "{}",
            ui::style_text("Could not load exchange rates", ui::StyleType::Error)
        );
        return RatesOrigin::Missing;
    }

    match DemoRateSource::rates_for(converter.base_currency())
        .and_then(|rates| {
            converter.load_rates(RateSnapshot::new(converter.base_currency(), rates, Utc::now()))
        }) {
        Ok(()) => {
            info!("Loaded demo rates for {}", converter.base_currency());
            println!(
                "{}",
                ui::style_text(
                    "Could not load exchange rates; using demonstration rates",
                    ui::StyleType::Warning
                )
            );
            RatesOrigin::Demo
        }
        Err(e) => {
            warn!("Demo rates unavailable: {:#}", e);
            println!(
                "{}",
                ui::style_text("Could not load exchange rates", ui::StyleType::Error)
            );
            RatesOrigin::Missing
        }
    }
}

/// Loads rates and fails when none could be obtained.
pub async fn require_rates(
    converter: &CurrencyConverter,
    config: &AppConfig,
    refresh: bool,
) -> Result<RatesOrigin> {
    let origin = load_rates(converter, config, refresh).await;
    if !origin.is_available() {
        bail!(
            "Exchange rates for {} are unavailable",
            converter.base_currency()
        );
    }
    Ok(origin)
}

fn origin_label(origin: RatesOrigin) -> &'static str {
    match origin {
        RatesOrigin::Live(RatesStatus::FromCache) => "cache",
        RatesOrigin::Live(_) => "live",
        RatesOrigin::Demo => "demo",
        RatesOrigin::Missing => "none",
    }
}

pub fn display_rates(converter: &CurrencyConverter, origin: RatesOrigin) -> String {
    let table_data = converter.rate_table();
    let base = converter.base_currency();

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Per 1 {base}")),
        ui::header_cell(&format!("{base} per unit")),
    ]);
    for (code, rate) in &table_data.rates {
        table.add_row(vec![
            Cell::new(code),
            ui::number_cell(format!("{rate:.6}")),
            ui::number_cell(format!("{:.6}", 1.0 / rate)),
        ]);
    }

    let updated = table_data
        .last_update
        .map_or("N/A".to_string(), |t| t.format("%d.%m.%Y %H:%M:%S UTC").to_string());
    format!(
        "{}\n\n{}\n\n{}",
        ui::style_text(&format!("Exchange rates ({base})"), ui::StyleType::Title),
        table,
        ui::style_text(
            &format!(
                "{} currencies, source: {}, updated: {}",
                table_data.rates.len(),
                origin_label(origin),
                updated
            ),
            ui::StyleType::Subtle
        )
    )
}

pub async fn run_currencies(config: &AppConfig) -> Result<()> {
    let converter = build_converter(config)?;
    let origin = require_rates(&converter, config, false).await?;
    println!("{}", display_rates(&converter, origin));
    Ok(())
}

pub async fn run_refresh(config: &AppConfig) -> Result<()> {
    let converter = build_converter(config)?;
    let origin = require_rates(&converter, config, true).await?;
    let count = converter.available_currencies().len();
    let message = match (origin, converter.last_update()) {
        (RatesOrigin::Demo, _) => format!("Using {count} demonstration rates"),
        (_, Some(updated)) => format!(
            "Rates updated at {}. {count} currencies available",
            updated.format("%d.%m.%Y %H:%M:%S UTC")
        ),
        (_, None) => format!("Rates updated. {count} currencies available"),
    };
    println!("{}", ui::style_text(&message, ui::StyleType::Result));
    Ok(())
}
