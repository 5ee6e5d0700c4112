pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info};

/// Commands that need a loaded configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Currency {
        amount: f64,
        from: String,
        to: String,
    },
    Unit {
        value: f64,
        from: String,
        to: String,
    },
    Units {
        category: Option<String>,
    },
    Currencies,
    Refresh,
    Batch {
        input: PathBuf,
        /// `Some(None)` exports to a timestamped file in the data directory.
        export: Option<Option<PathBuf>>,
    },
}

pub async fn run_command(cmd: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("xconv starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!(
        base_currency = %config.base_currency,
        provider_url = %config.providers.exchangerate.base_url,
        cache_enabled = config.cache.enabled,
        demo_fallback = config.demo_fallback,
        "Loaded config"
    );

    match cmd {
        AppCommand::Currency { amount, from, to } => {
            cli::convert::run_currency(&config, amount, &from, &to).await
        }
        AppCommand::Unit { value, from, to } => cli::convert::run_unit(value, &from, &to),
        AppCommand::Units { category } => cli::units::run(category.as_deref()),
        AppCommand::Currencies => cli::rates::run_currencies(&config).await,
        AppCommand::Refresh => cli::rates::run_refresh(&config).await,
        AppCommand::Batch { input, export } => cli::batch::run(&config, &input, export).await,
    }
}
