//! History command - list recorded single calculations

use crate::cmd::format_amount;
use crate::store::{JsonStore, StoredCalculation};
use crate::tax::list_calculations;
use clap::Args;
use std::path::Path;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct HistoryCommand {
    /// Output as JSON instead of formatted table
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Tabled)]
struct HistoryRow {
    #[tabled(rename = "#")]
    id: u64,

    #[tabled(rename = "Date")]
    created_at: String,

    #[tabled(rename = "Income")]
    total_income: String,

    #[tabled(rename = "WHT")]
    wht: String,

    #[tabled(rename = "Personal")]
    personal_allowance: String,

    #[tabled(rename = "Donation")]
    donation: String,

    #[tabled(rename = "K-Receipt")]
    k_receipt: String,

    #[tabled(rename = "Tax")]
    tax: String,

    #[tabled(rename = "Payable")]
    tax_payable: String,

    #[tabled(rename = "Refund")]
    tax_refund: String,
}

impl From<&StoredCalculation> for HistoryRow {
    fn from(stored: &StoredCalculation) -> Self {
        let c = &stored.calculation;
        HistoryRow {
            id: stored.id,
            created_at: stored.created_at.format("%Y-%m-%d %H:%M").to_string(),
            total_income: format_amount(c.total_income),
            wht: format_amount(c.wht),
            personal_allowance: format_amount(c.personal_allowance),
            donation: format_amount(c.donation),
            k_receipt: format_amount(c.k_receipt),
            tax: format_amount(c.tax),
            tax_payable: format_amount(c.tax_payable),
            tax_refund: format_amount(c.tax_refund),
        }
    }
}

impl HistoryCommand {
    pub fn exec(&self, store_path: &Path) -> anyhow::Result<()> {
        let store = JsonStore::open(store_path)?;
        let calculations = list_calculations(&store)?;
        log::info!("Loaded {} calculations", calculations.len());

        if self.json {
            println!("{}", serde_json::to_string_pretty(&calculations)?);
            return Ok(());
        }

        if calculations.is_empty() {
            println!("No calculations recorded");
            return Ok(());
        }

        let table = Table::new(calculations.iter().map(HistoryRow::from))
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
        Ok(())
    }
}
