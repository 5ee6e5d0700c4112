//! Core conversion engine: currency rates, unit tables and results

pub mod cache;
pub mod config;
pub mod conversion;
pub mod currency;
pub mod error;
pub mod history;
pub mod log;
pub mod units;

// Re-export main types for cleaner imports
pub use cache::{RateCache, RateSnapshot};
pub use conversion::{ConversionKind, ConversionResult};
pub use currency::{CurrencyConverter, RateSource, RateTable, RatesStatus};
pub use error::ConversionError;
pub use history::History;
pub use units::Category;
