//! Chronological record of conversions and its text report.

use crate::core::conversion::{ConversionKind, ConversionResult};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

const REPORT_TITLE: &str = "Conversion history";

/// Append-only list of conversion results, oldest first.
#[derive(Debug, Default, Clone)]
pub struct History {
    entries: Vec<ConversionResult>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: ConversionResult) {
        self.entries.push(result);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ConversionResult] {
        &self.entries
    }

    pub fn newest_first(&self) -> impl Iterator<Item = &ConversionResult> {
        self.entries.iter().rev()
    }

    pub fn default_report_name(now: DateTime<Local>) -> String {
        format!("history_{}.txt", now.format("%Y%m%d_%H%M%S"))
    }

    /// Renders the report text, newest entries first.
    pub fn report(&self) -> String {
        let mut out = format!("{REPORT_TITLE}\n{}\n\n", "=".repeat(60));
        for (i, entry) in self.newest_first().enumerate() {
            let _ = writeln!(out, "{}", report_line(i + 1, entry));
        }
        out
    }

    pub fn write_report<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.report())
            .with_context(|| format!("Failed to write history to {}", path.display()))?;
        info!("Saved {} conversions to {}", self.len(), path.display());
        Ok(())
    }
}

fn report_line(index: usize, entry: &ConversionResult) -> String {
    let time = entry.timestamp.format("%d.%m.%Y %H:%M:%S");
    match entry.kind {
        ConversionKind::Currency { rate } => format!(
            "{index:3}. {time} | {} {} → {} {} | Rate: 1 {} = {rate:.6} {}",
            format_money(entry.amount),
            entry.from_unit,
            format_money(entry.result),
            entry.to_unit,
            entry.from_unit,
            entry.to_unit
        ),
        ConversionKind::Unit { .. } => format!(
            "{index:3}. {time} | {} {} → {} {}",
            format_significant(entry.amount, 6),
            entry.from_unit,
            format_significant(entry.result, 6),
            entry.to_unit
        ),
    }
}

/// Two decimals with thousands grouped by spaces, e.g. `1 234 567.89`.
pub fn format_money(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((&fixed, "00"));
    let grouped = group_thousands(int_part);
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

/// Formats with `digits` significant digits, dropping trailing zeros.
///
/// Switches to exponent notation outside `1e-4 <= |x| < 10^digits`.
pub fn format_significant(value: f64, digits: usize) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{value}");
    }
    let precision = digits.saturating_sub(1);
    let sci = format!("{:.*e}", precision, value);
    let exponent: i32 = sci
        .split_once('e')
        .and_then(|(_, exp)| exp.parse().ok())
        .unwrap_or(0);

    if exponent < -4 || exponent >= digits as i32 {
        let (mantissa, exp) = sci.split_once('e').unwrap_or((&sci, "0"));
        return format!("{}e{}", trim_zeros(mantissa), exp);
    }

    let decimals = (precision as i32 - exponent).max(0) as usize;
    let fixed = format!("{:.*}", decimals, value);
    let trimmed = trim_zeros(&fixed);
    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (trimmed, None),
    };
    let (sign, int_digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };
    let grouped = group_thousands(int_digits);
    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::units::Category;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn at(result: ConversionResult, secs: u32) -> ConversionResult {
        ConversionResult {
            timestamp: Local.with_ymd_and_hms(2024, 3, 5, 14, 7, secs).unwrap(),
            ..result
        }
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0.0), "0.00");
        assert_eq!(format_money(1234567.891), "1 234 567.89");
        assert_eq!(format_money(999.999), "1 000.00");
        assert_eq!(format_money(-4321.5), "-4 321.50");
        assert_eq!(format_money(-0.001), "0.00");
    }

    #[test]
    fn test_format_significant() {
        assert_eq!(format_significant(1000.0, 6), "1 000");
        assert_eq!(format_significant(1.609344, 6), "1.60934");
        assert_eq!(format_significant(0.5, 6), "0.5");
        assert_eq!(format_significant(-273.15, 6), "-273.15");
        assert_eq!(format_significant(1234567.0, 6), "1.23457e6");
        assert_eq!(format_significant(0.00001, 6), "1e-5");
        assert_eq!(format_significant(0.0, 6), "0");
    }

    #[test]
    fn test_history_order() {
        let mut history = History::new();
        assert!(history.is_empty());
        history.push(ConversionResult::unit(1.0, "км", "м", 1000.0, Category::Length));
        history.push(ConversionResult::unit(0.0, "°C", "K", 273.15, Category::Temperature));

        assert_eq!(history.len(), 2);
        assert_eq!(history.entries()[0].from_unit, "км");
        let newest: Vec<_> = history.newest_first().map(|r| r.from_unit.as_str()).collect();
        assert_eq!(newest, vec!["°C", "км"]);
    }

    #[test]
    fn test_report_format() {
        let mut history = History::new();
        history.push(at(
            ConversionResult::currency(1500.0, "USD".into(), "EUR".into(), 1363.636363, 0.909091),
            1,
        ));
        history.push(at(
            ConversionResult::unit(1.0, "морская миля", "м", 1852.0, Category::Length),
            2,
        ));

        let report = history.report();
        let lines: Vec<_> = report.lines().collect();
        assert_eq!(lines[0], "Conversion history");
        assert_eq!(lines[1], "=".repeat(60));
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "  1. 05.03.2024 14:07:02 | 1 морская миля → 1 852 м");
        assert_eq!(
            lines[4],
            "  2. 05.03.2024 14:07:01 | 1 500.00 USD → 1 363.64 EUR | Rate: 1 USD = 0.909091 EUR"
        );
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_write_report() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(History::default_report_name(Local::now()));
        let mut history = History::new();
        history.push(ConversionResult::unit(2.0, "ч", "мин", 120.0, Category::Time));

        history.write_report(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Conversion history\n"));
        assert!(content.contains("2 ч → 120 мин"));
    }

    #[test]
    fn test_default_report_name() {
        let now = Local.with_ymd_and_hms(2024, 12, 31, 23, 59, 58).unwrap();
        assert_eq!(History::default_report_name(now), "history_20241231_235958.txt");
    }
}
