//! Errors raised by the conversion engine for caller mistakes.

use thiserror::Error;

/// Input and state errors surfaced by currency and unit conversions.
///
/// Environmental failures (network, cache I/O) never show up here; they are
/// absorbed where they happen and reported as a status instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("Exchange rates are not loaded; fetch rates before converting currencies")]
    RatesNotLoaded,

    #[error("Unknown currency: {code}. Available: {}...", available.join(", "))]
    UnknownCurrency { code: String, available: Vec<String> },

    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    #[error("Incompatible units: {from} ({from_category}) and {to} ({to_category})")]
    IncompatibleUnits {
        from: String,
        from_category: String,
        to: String,
        to_category: String,
    },

    #[error("Amount must be a finite number, got {0}")]
    NonFiniteAmount(f64),

    #[error("Converting {amount:e} {from} to {to} overflows")]
    ResultOutOfRange { amount: f64, from: String, to: String },
}

impl ConversionError {
    /// Rejects a non-finite result produced from finite input.
    pub(crate) fn check_result(
        result: f64,
        amount: f64,
        from: &str,
        to: &str,
    ) -> Result<f64, Self> {
        if result.is_finite() {
            Ok(result)
        } else {
            Err(ConversionError::ResultOutOfRange {
                amount,
                from: from.to_string(),
                to: to.to_string(),
            })
        }
    }
}
