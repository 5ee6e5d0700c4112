use super::{rates, ui};
use crate::core::config::AppConfig;
use crate::core::history::format_money;
use crate::core::{ConversionError, ConversionKind, ConversionResult, units};
use anyhow::Result;

impl ConversionResult {
    /// One-line summary, e.g. `1 500.00 USD = 1 363.64 EUR`.
    pub fn display_line(&self) -> String {
        let (amount, result) = match self.kind {
            ConversionKind::Currency { .. } => {
                (format_money(self.amount), format_money(self.result))
            }
            ConversionKind::Unit { .. } => ui::format_quantities(self.amount, self.result),
        };
        format!("{} {} = {} {}", amount, self.from_unit, result, self.to_unit)
    }

    /// Directional rates for currency results; `None` for unit conversions.
    pub fn display_rates(&self) -> Option<String> {
        let rate = self.rate()?;
        let forward = format!("1 {} = {:.6} {}", self.from_unit, rate, self.to_unit);
        if rate == 0.0 {
            return Some(forward);
        }
        Some(format!(
            "{} | 1 {} = {:.6} {}",
            forward,
            self.to_unit,
            1.0 / rate,
            self.from_unit
        ))
    }
}

pub async fn run_currency(config: &AppConfig, amount: f64, from: &str, to: &str) -> Result<()> {
    let converter = rates::build_converter(config)?;
    rates::require_rates(&converter, config, false).await?;

    let result = converter.convert(from, to, amount)?;
    println!("{}", ui::style_text(&result.display_line(), ui::StyleType::Result));
    if let Some(rates_line) = result.display_rates() {
        println!("{}", ui::style_text(&rates_line, ui::StyleType::Subtle));
    }
    Ok(())
}

/// Lists the units `from` can be converted to, for incompatible-unit errors.
fn compatible_units_hint(error: &ConversionError, from: &str) -> Option<String> {
    if !matches!(error, ConversionError::IncompatibleUnits { .. }) {
        return None;
    }
    let category = units::unit_category(from)?;
    Some(format!("{} units: {}", category, units::units_in(category).join(", ")))
}

pub fn run_unit(value: f64, from: &str, to: &str) -> Result<()> {
    let result = match units::convert(value, from, to) {
        Ok(result) => result,
        Err(e) => {
            if let Some(hint) = compatible_units_hint(&e, from) {
                println!("{}", ui::style_text(&hint, ui::StyleType::Subtle));
            }
            return Err(e.into());
        }
    };
    println!("{}", ui::style_text(&result.display_line(), ui::StyleType::Result));
    println!(
        "{}",
        ui::style_text(
            &format!(
                "{} → {}",
                units::full_unit_name(from),
                units::full_unit_name(to)
            ),
            ui::StyleType::Subtle
        )
    );
    Ok(())
}
