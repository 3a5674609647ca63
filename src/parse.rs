//! Numeric parsing for batch import rows.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::str::FromStr;

const FIELDS: [&str; 3] = ["totalIncome", "wht", "donation"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("field {position} ({field}) is not a number: {value:?}")]
    InvalidNumber {
        position: usize,
        field: &'static str,
        value: String,
    },
    #[error("not a valid donation amount or percentage: {0:?}")]
    InvalidDonation(String),
}

/// Values extracted from one import row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParsedRow {
    pub total_income: Decimal,
    pub wht: Decimal,
    pub donation: Decimal,
}

/// Parse positional `income, wht, donation` fields. Missing trailing fields are zero.
pub fn parse_row<S: AsRef<str>>(fields: &[S]) -> Result<ParsedRow, ParseError> {
    let mut row = ParsedRow::default();

    if let Some(field) = fields.first() {
        row.total_income = parse_field(0, field.as_ref())?;
    }
    if let Some(field) = fields.get(1) {
        row.wht = parse_field(1, field.as_ref())?;
    }
    if let Some(field) = fields.get(2) {
        row.donation = parse_donation(field.as_ref()).map_err(|_| ParseError::InvalidNumber {
            position: 2,
            field: FIELDS[2],
            value: field.as_ref().to_string(),
        })?;
    }

    Ok(row)
}

/// Parse a donation that is either an absolute amount or a `N%` expression.
///
/// `"5%"` yields the fraction `0.05`; it is not applied to any income.
pub fn parse_donation(text: &str) -> Result<Decimal, ParseError> {
    let text = text.trim();
    let invalid = || ParseError::InvalidDonation(text.to_string());

    match text.strip_suffix('%') {
        Some(percentage) => {
            let percentage = parse_number(percentage).ok_or_else(invalid)?;
            Ok(percentage / dec!(100))
        }
        None => parse_number(text).ok_or_else(invalid),
    }
}

fn parse_field(position: usize, text: &str) -> Result<Decimal, ParseError> {
    parse_number(text.trim()).ok_or_else(|| ParseError::InvalidNumber {
        position,
        field: FIELDS[position],
        value: text.to_string(),
    })
}

fn parse_number(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_row() {
        let row = parse_row(&["500000", "50000", "20000"]).unwrap();
        assert_eq!(
            row,
            ParsedRow {
                total_income: dec!(500000),
                wht: dec!(50000),
                donation: dec!(20000),
            }
        );
    }

    #[test]
    fn percentage_donation_is_raw_fraction() {
        let row = parse_row(&["500000", "50000", "5%"]).unwrap();
        assert_eq!(row.donation, dec!(0.05));
        assert_eq!(row.total_income, dec!(500000));
    }

    #[test]
    fn missing_fields_default_to_zero() {
        assert_eq!(
            parse_row(&["750000"]).unwrap(),
            ParsedRow {
                total_income: dec!(750000),
                ..Default::default()
            }
        );
        assert_eq!(parse_row::<&str>(&[]).unwrap(), ParsedRow::default());
    }

    #[test]
    fn fields_are_trimmed() {
        let row = parse_row(&["   600000", " 40000 ", "20000  "]).unwrap();
        assert_eq!(row.total_income, dec!(600000));
        assert_eq!(row.wht, dec!(40000));
        assert_eq!(row.donation, dec!(20000));
    }

    #[test]
    fn invalid_field_names_position() {
        let err = parse_row(&["500000", "abc", "0"]).unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidNumber {
                position: 1,
                field: "wht",
                value: "abc".to_string(),
            }
        );

        let err = parse_row(&["500000", "0", "ten%"]).unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { position: 2, .. }));
    }

    #[test]
    fn empty_field_is_an_error() {
        let err = parse_row(&["", "0"]).unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { position: 0, .. }));
    }

    #[test]
    fn donation_forms() {
        assert_eq!(parse_donation("15000").unwrap(), dec!(15000));
        assert_eq!(parse_donation(" 12.5% ").unwrap(), dec!(0.125));
        assert_eq!(parse_donation("1e3").unwrap(), dec!(1000));
        assert_eq!(
            parse_donation("%"),
            Err(ParseError::InvalidDonation("%".to_string()))
        );
        assert!(parse_donation("5%%").is_err());
    }
}
