use crate::config::Configuration;
use crate::parse::parse_row;
use crate::tax::schedule::{tax_for, Settlement, BATCH_SCHEDULE};
use crate::tax::TaxError;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Read;

/// Calculate tax for one imported row.
///
/// The donation is deducted as given, without the single-calculation cap.
/// Imported values are not range checked, so `None` is returned when the
/// arithmetic overflows.
pub fn calculate_batch_tax(
    total_income: Decimal,
    wht: Decimal,
    donation: Decimal,
    config: &Configuration,
) -> Option<Settlement> {
    let taxable_income = total_income
        .checked_sub(config.personal_deduction)?
        .checked_sub(donation)?;
    let (bracket, tax) = tax_for(&BATCH_SCHEDULE, taxable_income.max(Decimal::ZERO));

    log::debug!(
        "Batch income {} taxable {} bracket {} tax {}",
        total_income,
        taxable_income,
        BATCH_SCHEDULE[bracket].label,
        tax
    );
    Settlement::checked(tax, wht)
}

/// Result line for one imported row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_income: Decimal,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub tax: Option<Decimal>,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub tax_refund: Option<Decimal>,
}

impl BatchResult {
    fn new(total_income: Decimal, settlement: Settlement) -> Self {
        if settlement.tax_refund > Decimal::ZERO {
            BatchResult {
                total_income,
                tax: None,
                tax_refund: Some(settlement.tax_refund),
            }
        } else {
            BatchResult {
                total_income,
                tax: Some(settlement.tax_payable),
                tax_refund: None,
            }
        }
    }
}

/// Read `income,wht,donation` rows (after a header row) and calculate each in order.
///
/// Rows may omit trailing columns. The first unparseable row aborts the import.
pub fn import_csv<R: Read>(
    reader: R,
    config: &Configuration,
) -> Result<Vec<BatchResult>, TaxError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut results = Vec::new();
    for (index, record) in rdr.records().enumerate() {
        let record = record?;
        let fields: Vec<&str> = record.iter().collect();
        let row = parse_row(&fields[..]).map_err(|source| TaxError::Parse {
            row: index + 1,
            source,
        })?;

        let settlement = calculate_batch_tax(row.total_income, row.wht, row.donation, config)
            .ok_or(TaxError::OutOfRange { row: index + 1 })?;
        results.push(BatchResult::new(row.total_income, settlement));
    }

    log::info!("Calculated tax for {} imported rows", results.len());
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::ParseError;
    use rust_decimal_macros::dec;

    fn config() -> Configuration {
        Configuration::new(dec!(60000), dec!(50000))
    }

    #[test]
    fn tax_payable_without_withholding() {
        let settlement = calculate_batch_tax(dec!(500000), dec!(0), dec!(0), &config()).unwrap();
        assert_eq!(settlement.tax_payable, dec!(29000));
        assert_eq!(settlement.tax_refund, dec!(0));
    }

    #[test]
    fn refund_when_withholding_exceeds_tax() {
        let settlement =
            calculate_batch_tax(dec!(600000), dec!(40000), dec!(20000), &config()).unwrap();
        assert_eq!(settlement.tax_payable, dec!(0));
        assert_eq!(settlement.tax_refund, dec!(2000));
    }

    #[test]
    fn donation_is_not_capped() {
        // 1,000,000 - 60,000 - 500,000 = 440,000
        let settlement =
            calculate_batch_tax(dec!(1000000), dec!(0), dec!(500000), &config()).unwrap();
        assert_eq!(settlement.tax_payable, dec!(29000));
    }

    #[test]
    fn non_positive_taxable_income_is_untaxed() {
        let settlement = calculate_batch_tax(dec!(50000), dec!(1000), dec!(0), &config()).unwrap();
        assert_eq!(settlement.tax_payable, dec!(0));
        assert_eq!(settlement.tax_refund, dec!(1000));

        let settlement = calculate_batch_tax(dec!(60000), dec!(0), dec!(0), &config()).unwrap();
        assert_eq!(settlement, Settlement::default());
    }

    #[test]
    fn lowest_bracket_is_taxed() {
        let settlement = calculate_batch_tax(dec!(160000), dec!(0), dec!(0), &config()).unwrap();
        assert_eq!(settlement.tax_payable, dec!(5000));
    }

    #[test]
    fn import_rows() {
        let csv_data = "income,wht,donation
   500000,0,0
   600000,40000,20000
   750000,50000,15000";

        let results = import_csv(csv_data.as_bytes(), &config()).unwrap();
        assert_eq!(
            results,
            vec![
                BatchResult {
                    total_income: dec!(500000),
                    tax: Some(dec!(29000)),
                    tax_refund: None,
                },
                BatchResult {
                    total_income: dec!(600000),
                    tax: None,
                    tax_refund: Some(dec!(2000)),
                },
                BatchResult {
                    total_income: dec!(750000),
                    tax: Some(dec!(11250)),
                    tax_refund: None,
                },
            ]
        );
    }

    #[test]
    fn import_rows_of_varying_width() {
        let csv_data = "income,wht,donation\n200000\n500000,50000\n";
        let results = import_csv(csv_data.as_bytes(), &config()).unwrap();
        // 200,000 - 60,000 = 140,000 @ 5%
        assert_eq!(results[0].tax, Some(dec!(7000)));
        // 29,000 - 50,000
        assert_eq!(results[1].tax_refund, Some(dec!(21000)));
    }

    #[test]
    fn percentage_donation_passed_through_as_amount() {
        let csv_data = "income,wht,donation\n500000,0,5%\n";
        let results = import_csv(csv_data.as_bytes(), &config()).unwrap();
        // 440,000 - 0.05 = 439,999.95 taxed at 15,000 + 139,999.95 * 0.10
        assert_eq!(results[0].tax, Some(dec!(28999.995)));
    }

    #[test]
    fn zero_tax_reported_as_tax() {
        let csv_data = "income,wht,donation\n60000,0,0\n";
        let results = import_csv(csv_data.as_bytes(), &config()).unwrap();
        assert_eq!(results[0].tax, Some(dec!(0)));
        assert_eq!(results[0].tax_refund, None);
    }

    #[test]
    fn parse_failure_aborts_import() {
        let csv_data = "income,wht,donation\n500000,0,0\n600000,abc,0\n700000,0,0\n";
        let err = import_csv(csv_data.as_bytes(), &config()).unwrap_err();
        match err {
            TaxError::Parse { row, source } => {
                assert_eq!(row, 2);
                assert!(matches!(source, ParseError::InvalidNumber { position: 1, .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn overflowing_row_rejected() {
        let settlement = calculate_batch_tax(Decimal::MAX, dec!(0), -Decimal::MAX, &config());
        assert_eq!(settlement, None);

        let csv_data = format!(
            "income,wht,donation\n500000,0,0\n{},0,-{}\n",
            Decimal::MAX,
            Decimal::MAX
        );
        let err = import_csv(csv_data.as_bytes(), &config()).unwrap_err();
        assert!(matches!(err, TaxError::OutOfRange { row: 2 }), "{err}");
    }

    #[test]
    fn large_negative_withholding_rejected() {
        let csv_data = format!("income,wht,donation\n500000,-{},0\n", Decimal::MAX);
        let err = import_csv(csv_data.as_bytes(), &config()).unwrap_err();
        assert!(matches!(err, TaxError::OutOfRange { row: 1 }), "{err}");
    }

    #[test]
    fn json_output_uses_numbers() {
        let result = BatchResult {
            total_income: dec!(600000),
            tax: None,
            tax_refund: Some(dec!(2000)),
        };
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"totalIncome":600000.0,"taxRefund":2000.0}"#);
    }
}
