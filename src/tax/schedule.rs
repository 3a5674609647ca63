use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// One segment of a progressive schedule.
///
/// Tax for an income inside the segment is `base_tax + (income - lower) * rate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bracket {
    pub label: &'static str,
    pub lower: Decimal,
    /// Inclusive upper edge, `None` for the open top bracket
    pub upper: Option<Decimal>,
    pub rate: Decimal,
    pub base_tax: Decimal,
}

impl Bracket {
    const fn new(
        label: &'static str,
        lower: Decimal,
        upper: Option<Decimal>,
        rate: Decimal,
        base_tax: Decimal,
    ) -> Self {
        Bracket {
            label,
            lower,
            upper,
            rate,
            base_tax,
        }
    }

    pub fn contains(&self, income: Decimal) -> bool {
        self.upper.is_none_or(|upper| income <= upper)
    }

    pub fn tax(&self, income: Decimal) -> Decimal {
        self.base_tax + (income - self.lower) * self.rate
    }
}

/// Schedule used for single calculations.
///
/// The first bracket also absorbs negative taxable income.
pub const SINGLE_SCHEDULE: [Bracket; 5] = [
    Bracket::new("0-150,000", dec!(0), Some(dec!(150000)), dec!(0), dec!(0)),
    Bracket::new(
        "150,001-500,000",
        dec!(150000),
        Some(dec!(500000)),
        dec!(0.10),
        dec!(0),
    ),
    Bracket::new(
        "500,001-1,000,000",
        dec!(500000),
        Some(dec!(1000000)),
        dec!(0.15),
        dec!(35000),
    ),
    Bracket::new(
        "1,000,001-2,000,000",
        dec!(1000000),
        Some(dec!(2000000)),
        dec!(0.20),
        dec!(110000),
    ),
    Bracket::new(
        "2,000,001 and above",
        dec!(2000000),
        None,
        dec!(0.35),
        dec!(310000),
    ),
];

/// Schedule used for batch import rows.
pub const BATCH_SCHEDULE: [Bracket; 8] = [
    Bracket::new("1-150,000", dec!(0), Some(dec!(150000)), dec!(0.05), dec!(0)),
    Bracket::new(
        "150,001-300,000",
        dec!(150000),
        Some(dec!(300000)),
        dec!(0.05),
        dec!(7500),
    ),
    Bracket::new(
        "300,001-500,000",
        dec!(300000),
        Some(dec!(500000)),
        dec!(0.10),
        dec!(15000),
    ),
    Bracket::new(
        "500,001-750,000",
        dec!(500000),
        Some(dec!(750000)),
        dec!(0.15),
        dec!(35000),
    ),
    Bracket::new(
        "750,001-1,000,000",
        dec!(750000),
        Some(dec!(1000000)),
        dec!(0.20),
        dec!(57500),
    ),
    Bracket::new(
        "1,000,001-2,000,000",
        dec!(1000000),
        Some(dec!(2000000)),
        dec!(0.25),
        dec!(107500),
    ),
    Bracket::new(
        "2,000,001-5,000,000",
        dec!(2000000),
        Some(dec!(5000000)),
        dec!(0.30),
        dec!(357500),
    ),
    Bracket::new(
        "5,000,001 and above",
        dec!(5000000),
        None,
        dec!(0.35),
        dec!(1257500),
    ),
];

/// Index of the first bracket whose upper edge covers `income`.
pub fn bracket_index(schedule: &[Bracket], income: Decimal) -> usize {
    schedule
        .iter()
        .position(|bracket| bracket.contains(income))
        .unwrap_or(schedule.len() - 1)
}

/// Gross tax on `income` under `schedule`, with the matching bracket index.
///
/// The amount is exact; rounding happens only when it is displayed.
pub fn tax_for(schedule: &[Bracket], income: Decimal) -> (usize, Decimal) {
    let index = bracket_index(schedule, income);
    (index, schedule[index].tax(income))
}

/// Round to whole cents for display
pub fn round_amount(amount: Decimal) -> Decimal {
    amount.round_dp(2)
}

/// Outcome of offsetting gross tax against withholding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Settlement {
    pub tax_payable: Decimal,
    pub tax_refund: Decimal,
}

impl Settlement {
    pub fn new(tax: Decimal, wht: Decimal) -> Self {
        Self::from_balance(tax - wht)
    }

    /// As [`Settlement::new`], but `None` when `tax - wht` overflows.
    pub fn checked(tax: Decimal, wht: Decimal) -> Option<Self> {
        tax.checked_sub(wht).map(Self::from_balance)
    }

    fn from_balance(balance: Decimal) -> Self {
        if balance < Decimal::ZERO {
            Settlement {
                tax_payable: Decimal::ZERO,
                tax_refund: -balance,
            }
        } else {
            Settlement {
                tax_payable: balance,
                tax_refund: Decimal::ZERO,
            }
        }
    }
}
