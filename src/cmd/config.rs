//! Config command - view or change the deduction parameters

use crate::cmd::format_amount;
use crate::config::{apply_update, ConfigUpdate};
use crate::store::{ConfigProvider, JsonStore};
use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use std::path::Path;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the stored configuration
    Show(ShowCommand),
    /// Change one or both deduction parameters
    Set(SetCommand),
}

impl ConfigCommand {
    pub fn exec(&self, store_path: &Path) -> anyhow::Result<()> {
        match self {
            ConfigCommand::Show(show) => show.exec(store_path),
            ConfigCommand::Set(set) => set.exec(store_path),
        }
    }
}

#[derive(Args, Debug)]
pub struct ShowCommand {
    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

impl ShowCommand {
    fn exec(&self, store_path: &Path) -> anyhow::Result<()> {
        let store = JsonStore::open(store_path)?;
        let Some(config) = store.get_config()? else {
            anyhow::bail!("No configuration found in {}", store_path.display());
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            println!("Personal deduction: {}", format_amount(config.personal_deduction));
            println!("K-receipt cap:      {}", format_amount(config.k_receipt_cap));
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct SetCommand {
    /// Personal deduction subtracted from every income
    #[arg(short, long)]
    personal_deduction: Option<Decimal>,

    /// Maximum deductible k-receipt amount
    #[arg(short, long)]
    k_receipt: Option<Decimal>,
}

impl SetCommand {
    fn exec(&self, store_path: &Path) -> anyhow::Result<()> {
        let update = ConfigUpdate {
            personal_deduction: self.personal_deduction,
            k_receipt_cap: self.k_receipt,
        };
        if update.is_empty() {
            anyhow::bail!("Nothing to update: pass --personal-deduction and/or --k-receipt");
        }

        let mut store = JsonStore::open(store_path)?;
        let config = apply_update(&mut store, update)?;

        if let Some(personal_deduction) = update.personal_deduction {
            println!("Personal deduction: {}", format_amount(personal_deduction));
        }
        if let Some(k_receipt_cap) = update.k_receipt_cap {
            println!("K-receipt cap:      {}", format_amount(k_receipt_cap));
        }
        log::debug!("Stored configuration {:?}", config);
        Ok(())
    }
}
