use crate::config::Configuration;
use crate::store::{CalculationSink, ConfigProvider, StoredCalculation};
use crate::tax::schedule::{tax_for, Settlement, SINGLE_SCHEDULE};
use crate::tax::TaxError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Maximum deductible donation for a single calculation
pub const DONATION_CAP: Decimal = dec!(100000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum AllowanceType {
    Donation,
    KReceipt,
    /// Any other allowance type; accepted but not deducted
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Allowance {
    pub allowance_type: AllowanceType,
    #[schemars(with = "f64")]
    pub amount: Decimal,
}

impl Allowance {
    pub fn new(allowance_type: AllowanceType, amount: Decimal) -> Self {
        Allowance {
            allowance_type,
            amount,
        }
    }

    #[cfg(test)]
    pub fn donation(amount: Decimal) -> Self {
        Self::new(AllowanceType::Donation, amount)
    }

    #[cfg(test)]
    pub fn k_receipt(amount: Decimal) -> Self {
        Self::new(AllowanceType::KReceipt, amount)
    }
}

/// Breakdown row: one per bracket of the single schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxLevel {
    pub level: String,
    pub tax: Decimal,
}

/// Breakdown row as returned to callers, with the amount as a JSON number
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxLevelAmount {
    pub level: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax: Decimal,
}

impl From<&TaxLevel> for TaxLevelAmount {
    fn from(level: &TaxLevel) -> Self {
        TaxLevelAmount {
            level: level.level.clone(),
            tax: level.tax,
        }
    }
}

/// Full record of a single calculation, as handed to the store.
///
/// Amounts keep rust_decimal's string form so a stored record reads back exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxCalculation {
    pub total_income: Decimal,
    pub wht: Decimal,
    pub personal_allowance: Decimal,
    pub donation: Decimal,
    pub k_receipt: Decimal,
    pub taxable_income: Decimal,
    /// Gross tax before withholding
    pub tax: Decimal,
    pub tax_payable: Decimal,
    pub tax_refund: Decimal,
    pub tax_level: Vec<TaxLevel>,
    pub allowances: Vec<Allowance>,
}

/// Input for a single calculation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaxRequest {
    /// Total income for the year
    #[schemars(with = "f64")]
    pub total_income: Decimal,
    /// Tax already withheld
    #[schemars(with = "f64")]
    pub wht: Decimal,
    /// Claimed allowances; at least one entry is required
    pub allowances: Vec<Allowance>,
    /// Include the per-bracket breakdown in the response
    #[serde(default)]
    pub include_tax_level: bool,
}

impl TaxRequest {
    pub fn validate(&self) -> Result<(), TaxError> {
        if self.total_income < Decimal::ZERO {
            return Err(TaxError::Validation("total income must not be negative".into()));
        }
        if self.wht < Decimal::ZERO {
            return Err(TaxError::Validation("wht must not be negative".into()));
        }
        if self.allowances.is_empty() {
            return Err(TaxError::Validation("at least one allowance is required".into()));
        }
        if self.allowances.iter().any(|a| a.amount < Decimal::ZERO) {
            return Err(TaxError::Validation("allowance amounts must not be negative".into()));
        }
        Ok(())
    }
}

/// Caller-facing result: at most one of `tax` and `tax_refund` is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxResponse {
    #[serde(
        serialize_with = "rust_decimal::serde::float_option::serialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub tax: Option<Decimal>,
    #[serde(
        serialize_with = "rust_decimal::serde::float_option::serialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub tax_refund: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_level: Option<Vec<TaxLevelAmount>>,
}

impl TaxResponse {
    pub fn new(calculation: &TaxCalculation, include_tax_level: bool) -> Self {
        let (tax, tax_refund) = if calculation.tax_payable > Decimal::ZERO {
            (Some(calculation.tax_payable), None)
        } else if calculation.tax_refund > Decimal::ZERO {
            (None, Some(calculation.tax_refund))
        } else {
            (None, None)
        };

        TaxResponse {
            tax,
            tax_refund,
            tax_level: include_tax_level
                .then(|| calculation.tax_level.iter().map(TaxLevelAmount::from).collect()),
        }
    }
}

/// Calculate tax for one taxpayer.
///
/// Only the last donation and last k-receipt entry count; earlier entries of
/// the same type are overwritten, not summed.
pub fn calculate_tax(
    total_income: Decimal,
    wht: Decimal,
    allowances: &[Allowance],
    config: &Configuration,
) -> TaxCalculation {
    let personal_allowance = config.personal_deduction;
    let mut donation = Decimal::ZERO;
    let mut k_receipt = Decimal::ZERO;

    for allowance in allowances {
        match allowance.allowance_type {
            AllowanceType::Donation => donation = allowance.amount.min(DONATION_CAP),
            AllowanceType::KReceipt => k_receipt = allowance.amount.min(config.k_receipt_cap),
            AllowanceType::Other => {}
        }
    }

    let taxable_income = total_income - personal_allowance - donation - k_receipt;
    let (bracket, tax) = tax_for(&SINGLE_SCHEDULE, taxable_income);
    let Settlement {
        tax_payable,
        tax_refund,
    } = Settlement::new(tax, wht);

    log::debug!(
        "Taxable income {} in bracket {}: tax {}, payable {}, refund {}",
        taxable_income,
        SINGLE_SCHEDULE[bracket].label,
        tax,
        tax_payable,
        tax_refund
    );

    // the payable amount is reported against the bracket the income fell into
    let tax_level = SINGLE_SCHEDULE
        .iter()
        .enumerate()
        .map(|(index, b)| TaxLevel {
            level: b.label.to_string(),
            tax: if index == bracket {
                tax_payable
            } else {
                Decimal::ZERO
            },
        })
        .collect();

    TaxCalculation {
        total_income,
        wht,
        personal_allowance,
        donation,
        k_receipt,
        taxable_income,
        tax,
        tax_payable,
        tax_refund,
        tax_level,
        allowances: allowances.to_vec(),
    }
}

/// Validate `request`, calculate against the stored configuration and record the result.
pub fn calculate_and_record<S>(store: &mut S, request: &TaxRequest) -> Result<TaxResponse, TaxError>
where
    S: ConfigProvider + CalculationSink,
{
    request.validate()?;
    let config = store
        .get_config()?
        .ok_or(TaxError::ConfigurationUnavailable)?;

    let calculation = calculate_tax(
        request.total_income,
        request.wht,
        &request.allowances,
        &config,
    );
    let id = store.save_calculation(&calculation)?;
    log::info!("Saved calculation {}", id);

    Ok(TaxResponse::new(&calculation, request.include_tax_level))
}

/// Previously recorded calculations, oldest first
pub fn list_calculations<S>(store: &S) -> Result<Vec<StoredCalculation>, TaxError>
where
    S: CalculationSink,
{
    Ok(store.list_calculations()?)
}
