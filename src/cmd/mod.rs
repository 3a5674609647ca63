pub mod calculate;
pub mod config;
pub mod history;
pub mod import;
pub mod schema;

use crate::tax::schedule::round_amount;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Read a whole input file, or stdin when the path is "-"
pub fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    if path.as_os_str() == "-" {
        io::stdin().lock().read_to_end(&mut buffer)?;
        if buffer.is_empty() {
            anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
        }
    } else {
        BufReader::new(File::open(path)?).read_to_end(&mut buffer)?;
    }
    Ok(buffer)
}

pub fn format_amount(amount: Decimal) -> String {
    let formatted = format!("{:.2}", round_amount(amount).abs());
    let (whole, fraction) = formatted.split_once('.').unwrap_or((&formatted, "00"));

    let mut grouped = String::new();
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if amount < Decimal::ZERO { "-" } else { "" };
    format!("{sign}{grouped}.{fraction}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn amounts_grouped_by_thousands() {
        assert_eq!(format_amount(dec!(0)), "0.00");
        assert_eq!(format_amount(dec!(999.5)), "999.50");
        assert_eq!(format_amount(dec!(29000)), "29,000.00");
        assert_eq!(format_amount(dec!(1257500.25)), "1,257,500.25");
        assert_eq!(format_amount(dec!(-55000)), "-55,000.00");
        assert_eq!(format_amount(dec!(28999.995)), "29,000.00");
    }
}
