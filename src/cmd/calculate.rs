//! Calculate command - single tax calculation recorded to history

use crate::cmd::{format_amount, read_input};
use crate::store::JsonStore;
use crate::tax::{calculate_and_record, Allowance, AllowanceType, TaxRequest, TaxResponse};
use anyhow::Context;
use clap::Args;
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct CalculateCommand {
    /// JSON file containing the full request (or "-" for stdin)
    #[arg(short, long, conflicts_with_all = ["income", "wht", "allowances"])]
    request: Option<PathBuf>,

    /// Total income for the year
    #[arg(short, long)]
    income: Option<Decimal>,

    /// Tax already withheld
    #[arg(short, long)]
    wht: Option<Decimal>,

    /// Allowance as TYPE=AMOUNT, e.g. donation=10000 or k-receipt=20000 (repeatable)
    #[arg(short, long = "allowance", value_parser = parse_allowance)]
    allowances: Vec<Allowance>,

    /// Include the per-bracket breakdown
    #[arg(short, long)]
    tax_level: bool,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

#[derive(Tabled)]
struct LevelRow {
    #[tabled(rename = "Level")]
    level: String,
    #[tabled(rename = "Tax")]
    tax: String,
}

impl CalculateCommand {
    pub fn exec(&self, store_path: &Path) -> anyhow::Result<()> {
        let request = self.build_request()?;
        let mut store = JsonStore::open(store_path)?;
        let response = calculate_and_record(&mut store, &request)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&response)?);
        } else {
            print_response(&response);
        }
        Ok(())
    }

    fn build_request(&self) -> anyhow::Result<TaxRequest> {
        if let Some(path) = &self.request {
            let mut request: TaxRequest = serde_json::from_slice(&read_input(path)?)
                .with_context(|| format!("invalid request in {}", path.display()))?;
            request.include_tax_level |= self.tax_level;
            return Ok(request);
        }

        let total_income = self
            .income
            .context("either --income or --request is required")?;
        Ok(TaxRequest {
            total_income,
            wht: self.wht.unwrap_or_default(),
            allowances: self.allowances.clone(),
            include_tax_level: self.tax_level,
        })
    }
}

fn print_response(response: &TaxResponse) {
    println!();
    match (response.tax, response.tax_refund) {
        (Some(tax), _) => println!("TAX PAYABLE: {}", format_amount(tax)),
        (_, Some(refund)) => println!("TAX REFUND: {}", format_amount(refund)),
        _ => println!("NO TAX DUE"),
    }

    if let Some(levels) = &response.tax_level {
        let rows = levels.iter().map(|l| LevelRow {
            level: l.level.clone(),
            tax: format_amount(l.tax),
        });
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
            .to_string();
        println!();
        println!("{}", table);
    }
    println!();
}

fn parse_allowance(s: &str) -> Result<Allowance, String> {
    let (kind, amount) = s
        .split_once('=')
        .ok_or_else(|| format!("expected TYPE=AMOUNT, got {s:?}"))?;
    let allowance_type = match kind.trim().to_lowercase().as_str() {
        "donation" => AllowanceType::Donation,
        "k-receipt" => AllowanceType::KReceipt,
        _ => AllowanceType::Other,
    };
    let amount = Decimal::from_str(amount.trim()).map_err(|e| format!("invalid amount: {e}"))?;
    Ok(Allowance::new(allowance_type, amount))
}
