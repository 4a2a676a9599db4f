use crate::core::loan_type::LoanType;
use crate::core::product::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An applicant's simulation request.
///
/// Requests are ephemeral: they are validated against a product and
/// either produce a result or a single error.
///
/// # Examples
///
/// ```
/// use loan_simulator::core::loan_type::LoanType;
/// use loan_simulator::core::product::ProductId;
/// use loan_simulator::core::request::SimulationRequest;
/// use rust_decimal_macros::dec;
///
/// let request = SimulationRequest::new(ProductId::new(1), LoanType::Home, dec!(200_000), 240, dec!(60_000))
///     .with_property_value(dec!(250_000));
///
/// assert_eq!(request.property_value, Some(dec!(250_000)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub product_id: ProductId,
    pub loan_type: LoanType,
    pub loan_amount: Decimal,
    pub loan_term_months: u32,
    /// Annual gross income.
    pub income: Decimal,
    /// Collateral value for home and vehicle loans.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_value: Option<Decimal>,
}

impl SimulationRequest {
    pub fn new(
        product_id: ProductId,
        loan_type: LoanType,
        loan_amount: Decimal,
        loan_term_months: u32,
        income: Decimal,
    ) -> Self {
        Self {
            product_id,
            loan_type,
            loan_amount,
            loan_term_months,
            income,
            property_value: None,
        }
    }

    pub fn with_property_value(mut self, value: Decimal) -> Self {
        self.property_value = Some(value);
        self
    }

    /// The collateral value, if one was supplied and is positive.
    pub fn collateral_value(&self) -> Option<Decimal> {
        self.property_value.filter(|v| *v > Decimal::ZERO)
    }
}
