//! Import command - batch calculation over a CSV of taxpayers

use crate::cmd::{format_amount, read_input};
use crate::store::{ConfigProvider, JsonStore};
use crate::tax::schedule::round_amount;
use crate::tax::{import_csv, BatchResult, TaxError};
use clap::Args;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct ImportCommand {
    /// CSV file with `income,wht,donation` rows after a header (or "-" for stdin)
    file: PathBuf,

    /// Output as JSON instead of formatted table
    #[arg(long, conflicts_with = "csv")]
    json: bool,

    /// Output as CSV instead of formatted table
    #[arg(long)]
    csv: bool,
}

/// Row for the import table and CSV output
#[derive(Debug, Clone, Tabled, Serialize)]
struct ImportRow {
    #[tabled(rename = "Total Income")]
    total_income: String,

    #[tabled(rename = "Tax")]
    tax: String,

    #[tabled(rename = "Tax Refund")]
    tax_refund: String,
}

impl From<&BatchResult> for ImportRow {
    fn from(result: &BatchResult) -> Self {
        ImportRow {
            total_income: format!("{:.2}", round_amount(result.total_income)),
            tax: result
                .tax
                .map(|t| format!("{:.2}", round_amount(t)))
                .unwrap_or_default(),
            tax_refund: result
                .tax_refund
                .map(|r| format!("{:.2}", round_amount(r)))
                .unwrap_or_default(),
        }
    }
}

#[derive(Serialize)]
struct ImportOutput<'a> {
    taxes: &'a [BatchResult],
}

impl ImportCommand {
    pub fn exec(&self, store_path: &Path) -> anyhow::Result<()> {
        let store = JsonStore::open(store_path)?;
        let config = store
            .get_config()?
            .ok_or(TaxError::ConfigurationUnavailable)?;

        let input = read_input(&self.file)?;
        let results = import_csv(input.as_slice(), &config)?;

        if self.json {
            let output = ImportOutput { taxes: &results };
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        } else if self.csv {
            self.write_csv(&results)
        } else {
            self.print_table(&results);
            Ok(())
        }
    }

    fn print_table(&self, results: &[BatchResult]) {
        if results.is_empty() {
            println!("No rows found");
            return;
        }

        let rows = results.iter().map(|r| {
            let mut row = ImportRow::from(r);
            row.total_income = format_amount(r.total_income);
            row
        });
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
    }

    fn write_csv(&self, results: &[BatchResult]) -> anyhow::Result<()> {
        let mut wtr = csv::Writer::from_writer(io::stdout());
        for result in results {
            wtr.serialize(ImportRow::from(result))?;
        }
        wtr.flush()?;
        Ok(())
    }
}
