//! Runs a file of conversions and reports them as a history.

use super::{rates, ui};
use crate::core::config::AppConfig;
use crate::core::history::{History, format_money};
use crate::core::{ConversionError, ConversionKind, CurrencyConverter, units};
use anyhow::{Context, Result, anyhow};
use chrono::Local;
use comfy_table::Cell;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One requested conversion: `<amount> <from> -> <to>`.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    pub amount: f64,
    pub from: String,
    pub to: String,
}

/// Parses a batch line; blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<BatchEntry>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (amount, rest) = line
        .split_once(char::is_whitespace)
        .ok_or_else(|| anyhow!("Expected '<amount> <from> -> <to>', got '{}'", line))?;
    let amount: f64 = amount
        .trim()
        .parse()
        .with_context(|| format!("Invalid amount: {amount}"))?;
    let (from, to) = rest
        .split_once("->")
        .ok_or_else(|| anyhow!("Missing '->' in '{}'", line))?;
    let (from, to) = (from.trim(), to.trim());
    if from.is_empty() || to.is_empty() {
        return Err(anyhow!("Missing unit in '{}'", line));
    }

    Ok(Some(BatchEntry {
        amount,
        from: from.to_string(),
        to: to.to_string(),
    }))
}

fn is_unit_conversion(entry: &BatchEntry) -> bool {
    units::unit_category(&entry.from).is_some() || units::unit_category(&entry.to).is_some()
}

/// Converts every entry, collecting successes into a history and errors per line.
pub async fn convert_all(
    config: &AppConfig,
    input: &str,
) -> Result<(History, Vec<(usize, String)>)> {
    let mut history = History::new();
    let mut errors = Vec::new();
    let mut converter: Option<CurrencyConverter> = None;

    for (index, line) in input.lines().enumerate() {
        let line_no = index + 1;
        let entry = match parse_line(line) {
            Ok(Some(entry)) => entry,
            Ok(None) => continue,
            Err(e) => {
                errors.push((line_no, e.to_string()));
                continue;
            }
        };
        debug!("Line {}: {:?}", line_no, entry);

        let result = if is_unit_conversion(&entry) {
            units::convert(entry.amount, &entry.from, &entry.to)
        } else {
            if converter.is_none() {
                let loaded = rates::build_converter(config)?;
                rates::load_rates(&loaded, config, false).await;
                converter = Some(loaded);
            }
            converter.as_ref().map_or(Err(ConversionError::RatesNotLoaded), |c| {
                c.convert(&entry.from, &entry.to, entry.amount)
            })
        };

        match result {
            Ok(result) => history.push(result),
            Err(e) => errors.push((line_no, e.to_string())),
        }
    }

    Ok((history, errors))
}

impl History {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("#"),
            ui::header_cell("Time"),
            ui::header_cell("Amount"),
            ui::header_cell("From"),
            ui::header_cell("Result"),
            ui::header_cell("To"),
            ui::header_cell("Rate"),
        ]);

        for (i, entry) in self.newest_first().enumerate() {
            let (amount, result, rate) = match entry.kind {
                ConversionKind::Currency { rate } => (
                    format_money(entry.amount),
                    format_money(entry.result),
                    format!("{rate:.6}"),
                ),
                ConversionKind::Unit { .. } => {
                    let (amount, result) = ui::format_quantities(entry.amount, entry.result);
                    (amount, result, String::new())
                }
            };
            table.add_row(vec![
                ui::number_cell(format!("{}", i + 1)),
                Cell::new(entry.timestamp.format("%d.%m.%Y %H:%M:%S")),
                ui::number_cell(amount),
                Cell::new(&entry.from_unit),
                ui::number_cell(result),
                Cell::new(&entry.to_unit),
                ui::number_cell(rate),
            ]);
        }

        let currency = self.entries().iter().filter(|r| r.is_currency()).count();
        let summary = format!(
            "Total conversions: {} ({} currency, {} unit)",
            self.len(),
            currency,
            self.len() - currency
        );
        format!(
            "{}\n\n{}\n\n{}",
            ui::style_text("Conversion history", ui::StyleType::Title),
            table,
            ui::style_text(&summary, ui::StyleType::Subtle)
        )
    }
}

/// Resolves where the report goes; without an explicit path it lands in the data directory.
pub fn export_path(config: &AppConfig, export: Option<PathBuf>) -> Result<PathBuf> {
    match export {
        Some(path) => Ok(path),
        None => Ok(config
            .default_data_path()?
            .join(History::default_report_name(Local::now()))),
    }
}

pub async fn run(
    config: &AppConfig,
    input_path: &Path,
    export: Option<Option<PathBuf>>,
) -> Result<()> {
    let input = std::fs::read_to_string(input_path)
        .with_context(|| format!("Failed to read batch file: {}", input_path.display()))?;

    let (history, errors) = convert_all(config, &input).await?;

    for (line_no, error) in &errors {
        println!(
            "{}",
            ui::style_text(&format!("Line {line_no}: {error}"), ui::StyleType::Error)
        );
    }

    if history.is_empty() {
        println!("No conversions were performed");
    } else {
        println!("{}", history.display_as_table());
    }

    if let Some(export) = export {
        let path = export_path(config, export)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        history.write_report(&path)?;
        println!(
            "{}",
            ui::style_text(
                &format!("History saved to {}", path.display()),
                ui::StyleType::Result
            )
        );
    }
    Ok(())
}
