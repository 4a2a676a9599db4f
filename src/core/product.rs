use crate::core::loan_type::LoanType;
use crate::core::risk_band::RiskBandTable;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog identifier of a loan product.
///
/// # Examples
///
/// ```
/// use loan_simulator::core::product::ProductId;
///
/// let id = ProductId::new(7);
/// assert_eq!(id.value(), 7);
/// assert_eq!(id.to_string(), "7");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(u32);

impl ProductId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ProductId {
    fn from(id: u32) -> Self {
        Self::new(id)
    }
}

/// A loan product from the catalog.
///
/// Products are managed by an administrator outside this crate and are
/// only ever read by the engine. All rates and ratios are percentages
/// (`dec!(4.5)` means 4.5%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanProduct {
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub loan_type: LoanType,
    pub min_amount: Decimal,
    pub max_amount: Decimal,
    pub min_term_months: u32,
    pub max_term_months: u32,
    /// Nominal annual rate before risk adjustment.
    pub base_rate: Decimal,
    /// LTV cap for secured products.
    #[serde(default)]
    pub max_ltv: Option<Decimal>,
    pub max_dti: Decimal,
    #[serde(default)]
    pub origination_fee_percent: Decimal,
    #[serde(default)]
    pub risk_bands: RiskBandTable,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl LoanProduct {
    /// Whether `amount` lies within the product's principal bounds (inclusive).
    pub fn amount_in_range(&self, amount: Decimal) -> bool {
        amount >= self.min_amount && amount <= self.max_amount
    }

    /// Whether `months` lies within the product's term bounds (inclusive).
    pub fn term_in_range(&self, months: u32) -> bool {
        months >= self.min_term_months && months <= self.max_term_months
    }

    /// One-time origination fee charged on `amount`; `None` on overflow.
    pub fn origination_fee(&self, amount: Decimal) -> Option<Decimal> {
        amount
            .checked_mul(self.origination_fee_percent)?
            .checked_div(Decimal::ONE_HUNDRED)
    }
}
