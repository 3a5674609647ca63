//! Schema command - print expected input formats

use crate::tax::TaxRequest;
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output format: json-schema or csv-header
    #[arg(value_enum, default_value = "json-schema")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for a calculate request
    JsonSchema,
    /// CSV header row for the import file
    CsvHeader,
    /// CSV column descriptions
    CsvFields,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::JsonSchema => self.print_json_schema(),
            SchemaFormat::CsvHeader => self.print_csv_header(),
            SchemaFormat::CsvFields => self.print_csv_fields(),
        }
    }

    fn print_json_schema(&self) -> anyhow::Result<()> {
        let schema = schema_for!(TaxRequest);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }

    fn print_csv_header(&self) -> anyhow::Result<()> {
        let header: Vec<_> = CSV_FIELD_DESCRIPTIONS.iter().map(|(name, ..)| *name).collect();
        println!("{}", header.join(","));
        Ok(())
    }

    fn print_csv_fields(&self) -> anyhow::Result<()> {
        println!("CSV Import Format");
        println!("=================");
        println!();
        for (name, required, description) in CSV_FIELD_DESCRIPTIONS {
            let req = if *required { "required" } else { "optional" };
            println!("{:10} ({:8})  {}", name, req, description);
        }
        println!();
        println!("The first row is a header and is skipped. Columns are read by position.");
        Ok(())
    }
}

const CSV_FIELD_DESCRIPTIONS: &[(&str, bool, &str)] = &[
    ("income", false, "Total income for the year, 0 if omitted"),
    ("wht", false, "Tax already withheld, 0 if omitted"),
    (
        "donation",
        false,
        "Donation amount, or N% which is read as the fraction N/100",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_row;
    use rust_decimal::Decimal;

    #[test]
    fn omitted_columns_are_optional() {
        let row = parse_row::<&str>(&[]).unwrap();
        assert_eq!(row.total_income, Decimal::ZERO);
        assert_eq!(row.wht, Decimal::ZERO);
        assert!(CSV_FIELD_DESCRIPTIONS.iter().all(|(_, required, _)| !required));
    }
}
