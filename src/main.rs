use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use xconv::cli::setup::setup;
use xconv::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for xconv::AppCommand {
    fn from(cmd: Commands) -> xconv::AppCommand {
        match cmd {
            Commands::Currency { amount, from, to } => {
                xconv::AppCommand::Currency { amount, from, to }
            }
            Commands::Unit { value, from, to } => xconv::AppCommand::Unit { value, from, to },
            Commands::Units { category } => xconv::AppCommand::Units { category },
            Commands::Currencies => xconv::AppCommand::Currencies,
            Commands::Refresh => xconv::AppCommand::Refresh,
            Commands::Batch { input, export } => xconv::AppCommand::Batch { input, export },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount between two currencies
    Currency {
        #[arg(allow_negative_numbers = true)]
        amount: f64,
        from: String,
        to: String,
    },
    /// Convert a value between two units of the same category
    Unit {
        #[arg(allow_negative_numbers = true)]
        value: f64,
        from: String,
        to: String,
    },
    /// List supported units, optionally for one category
    Units { category: Option<String> },
    /// Display loaded exchange rates
    Currencies,
    /// Fetch fresh exchange rates, bypassing the cache
    Refresh,
    /// Run conversions from a file, one `<amount> <from> -> <to>` per line
    Batch {
        input: PathBuf,
        /// Save the history report; defaults to a timestamped file in the data dir
        #[arg(short, long, num_args = 0..=1)]
        export: Option<Option<PathBuf>>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => xconv::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
