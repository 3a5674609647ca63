mod cmd;
mod config;
mod parse;
mod store;
mod tax;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "taxcalc", version, about = "Calculate personal income tax and refunds")]
struct Cli {
    /// JSON file holding the deduction configuration and calculation history
    #[arg(long, global = true, default_value = "taxcalc.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Calculate tax for one taxpayer and record it
    Calculate(cmd::calculate::CalculateCommand),
    /// Calculate tax for every row of a CSV file
    Import(cmd::import::ImportCommand),
    /// Show or change the deduction configuration
    #[command(subcommand)]
    Config(cmd::config::ConfigCommand),
    /// List recorded calculations
    History(cmd::history::HistoryCommand),
    /// Print expected input formats
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    log::debug!("Using store {}", cli.store.display());

    match &cli.command {
        Command::Calculate(calculate) => calculate.exec(&cli.store),
        Command::Import(import) => import.exec(&cli.store),
        Command::Config(config) => config.exec(&cli.store),
        Command::History(history) => history.exec(&cli.store),
        Command::Schema(schema) => schema.exec(),
    }
}
