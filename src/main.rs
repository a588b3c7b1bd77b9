use anyhow::Result;
use bitconv::core::Currency;
use bitconv::core::log::init_logging;
use clap::{CommandFactory, Parser, Subcommand};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file (also the target of `setup`)
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Show the price of one bitcoin
    Rate {
        /// Target currency (USD, GBP or EUR)
        #[arg(long)]
        currency: Option<Currency>,
    },
    /// Convert an amount of bitcoins
    Convert {
        /// Number of bitcoins
        #[arg(allow_negative_numbers = true)]
        coins: f64,
        /// Target currency (USD, GBP or EUR)
        #[arg(long)]
        currency: Option<Currency>,
    },
    /// Show the price of one bitcoin in every supported currency
    Rates,
}

impl From<Commands> for bitconv::AppCommand {
    fn from(cmd: Commands) -> bitconv::AppCommand {
        match cmd {
            Commands::Rate { currency } => bitconv::AppCommand::Rate { currency },
            Commands::Convert { coins, currency } => {
                bitconv::AppCommand::Convert { coins, currency }
            }
            Commands::Rates => bitconv::AppCommand::Rates,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => bitconv::cli::setup::setup_at_path(path),
            None => bitconv::cli::setup::setup(),
        },
        Some(cmd) => bitconv::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
