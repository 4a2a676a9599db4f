use crate::core::loan_type::LoanType;
use crate::core::product::ProductId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Why a simulation was rejected.
///
/// Every variant carries the offending value and the bound it violated so
/// callers can render a message without recomputing anything.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    #[error("loan product {product_id} is not available for new simulations")]
    ProductUnavailable { product_id: ProductId },

    #[error("requested a {requested} loan but product is a {product} loan")]
    TypeMismatch {
        requested: LoanType,
        product: LoanType,
    },

    #[error("loan amount {amount} is outside the allowed range [{min}, {max}]")]
    AmountOutOfRange {
        amount: Decimal,
        min: Decimal,
        max: Decimal,
    },

    #[error("loan term of {term_months} months is outside the allowed range [{min}, {max}]")]
    TermOutOfRange { term_months: u32, min: u32, max: u32 },

    #[error("annual income must be positive, got {income}")]
    InvalidIncome { income: Decimal },

    #[error("a positive property value is required for {loan_type} loans")]
    MissingPropertyValue {
        loan_type: LoanType,
        property_value: Option<Decimal>,
    },

    #[error("debt-to-income ratio {dti_ratio}% exceeds the maximum of {max_dti}%")]
    DtiExceeded { dti_ratio: Decimal, max_dti: Decimal },

    #[error("loan-to-value ratio {ltv_ratio}% exceeds the maximum of {max_ltv}%")]
    LtvExceeded { ltv_ratio: Decimal, max_ltv: Decimal },

    #[error("APR did not converge after {iterations} iterations (last step: {last_delta})")]
    AprComputationFailed { iterations: u32, last_delta: Decimal },

    #[error("numeric failure while computing {context}")]
    NumericFailure { context: &'static str },
}

impl SimulationError {
    /// Stable identifier for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            SimulationError::ProductUnavailable { .. } => "ProductUnavailable",
            SimulationError::TypeMismatch { .. } => "TypeMismatch",
            SimulationError::AmountOutOfRange { .. } => "AmountOutOfRange",
            SimulationError::TermOutOfRange { .. } => "TermOutOfRange",
            SimulationError::InvalidIncome { .. } => "InvalidIncome",
            SimulationError::MissingPropertyValue { .. } => "MissingPropertyValue",
            SimulationError::DtiExceeded { .. } => "DtiExceeded",
            SimulationError::LtvExceeded { .. } => "LtvExceeded",
            SimulationError::AprComputationFailed { .. } => "AprComputationFailed",
            SimulationError::NumericFailure { .. } => "NumericFailure",
        }
    }

    /// The request field a form should highlight, if the error points at one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            SimulationError::ProductUnavailable { .. } => Some("product_id"),
            SimulationError::TypeMismatch { .. } => Some("loan_type"),
            SimulationError::AmountOutOfRange { .. } => Some("loan_amount"),
            SimulationError::TermOutOfRange { .. } => Some("loan_term_months"),
            SimulationError::InvalidIncome { .. } | SimulationError::DtiExceeded { .. } => {
                Some("income")
            }
            SimulationError::MissingPropertyValue { .. } | SimulationError::LtvExceeded { .. } => {
                Some("property_value")
            }
            SimulationError::AprComputationFailed { .. }
            | SimulationError::NumericFailure { .. } => None,
        }
    }
}
