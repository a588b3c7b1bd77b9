pub mod cli;
pub mod core;
pub mod providers;

pub use crate::core::config;

use crate::core::{BitcoinConverter, Currency};
use crate::providers::CoindeskProvider;
use anyhow::Result;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppCommand {
    /// Price of one bitcoin; falls back to the configured currency.
    Rate { currency: Option<Currency> },
    /// Value of `coins` bitcoins; falls back to the configured currency.
    Convert {
        coins: f64,
        currency: Option<Currency>,
    },
    /// Every currency the index reports.
    Rates,
}

/// Runs `command` and returns what should be printed to stdout.
pub async fn execute(command: AppCommand, config_path: Option<&str>) -> Result<String> {
    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let provider = CoindeskProvider::from_config(&config.provider)?;

    match command {
        AppCommand::Rate { currency } => {
            let converter = BitcoinConverter::new(provider);
            cli::convert::rate(&converter, currency.unwrap_or(config.currency)).await
        }
        AppCommand::Convert { coins, currency } => {
            let converter = BitcoinConverter::new(provider);
            cli::convert::convert(&converter, currency.unwrap_or(config.currency), coins).await
        }
        AppCommand::Rates => cli::rates::run(&provider).await,
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("bitconv starting...");
    let output = execute(command, config_path).await?;
    println!("{output}");
    Ok(())
}
