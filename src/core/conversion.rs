//! The value object produced by both converters.

use crate::core::units::Category;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// What kind of conversion produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ConversionKind {
    /// Currency conversion; `rate` is the effective multiplier `result / amount`.
    Currency { rate: f64 },
    /// Physical unit conversion within a single category.
    Unit { category: Category },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub amount: f64,
    pub from_unit: String,
    pub to_unit: String,
    pub result: f64,
    pub timestamp: DateTime<Local>,
    pub kind: ConversionKind,
}

impl ConversionResult {
    pub(crate) fn currency(amount: f64, from: String, to: String, result: f64, rate: f64) -> Self {
        Self {
            amount,
            from_unit: from,
            to_unit: to,
            result,
            timestamp: Local::now(),
            kind: ConversionKind::Currency { rate },
        }
    }

    pub(crate) fn unit(
        amount: f64,
        from: &str,
        to: &str,
        result: f64,
        category: Category,
    ) -> Self {
        Self {
            amount,
            from_unit: from.to_string(),
            to_unit: to.to_string(),
            result,
            timestamp: Local::now(),
            kind: ConversionKind::Unit { category },
        }
    }

    /// Effective rate, present only for currency conversions.
    pub fn rate(&self) -> Option<f64> {
        match self.kind {
            ConversionKind::Currency { rate } => Some(rate),
            ConversionKind::Unit { .. } => None,
        }
    }

    pub fn is_currency(&self) -> bool {
        matches!(self.kind, ConversionKind::Currency { .. })
    }
}
