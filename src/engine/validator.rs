use crate::core::product::LoanProduct;
use crate::core::request::SimulationRequest;
use crate::engine::error::SimulationError;
use rust_decimal::Decimal;

/// A request that passed every input check against its product.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedRequest<'a> {
    pub product: &'a LoanProduct,
    pub request: &'a SimulationRequest,
    /// Positive collateral value, when one was supplied.
    pub collateral_value: Option<Decimal>,
}

/// Check a request against its product before any monetary computation.
///
/// Rules run in a fixed order and the first violation is returned, so the
/// same bad request always yields the same error:
///
/// 1. product is the one requested and is active
/// 2. loan type matches
/// 3. amount within bounds
/// 4. term within bounds
/// 5. income positive
/// 6. secured loans carry a positive property value
pub fn validate<'a>(
    product: &'a LoanProduct,
    request: &'a SimulationRequest,
) -> Result<ValidatedRequest<'a>, SimulationError> {
    if request.product_id != product.id || !product.is_active {
        return Err(SimulationError::ProductUnavailable {
            product_id: request.product_id,
        });
    }

    if request.loan_type != product.loan_type {
        return Err(SimulationError::TypeMismatch {
            requested: request.loan_type,
            product: product.loan_type,
        });
    }

    if !product.amount_in_range(request.loan_amount) {
        return Err(SimulationError::AmountOutOfRange {
            amount: request.loan_amount,
            min: product.min_amount,
            max: product.max_amount,
        });
    }

    if !product.term_in_range(request.loan_term_months) {
        return Err(SimulationError::TermOutOfRange {
            term_months: request.loan_term_months,
            min: product.min_term_months,
            max: product.max_term_months,
        });
    }

    if request.income <= Decimal::ZERO {
        return Err(SimulationError::InvalidIncome {
            income: request.income,
        });
    }

    let collateral_value = request.collateral_value();
    if request.loan_type.requires_collateral() && collateral_value.is_none() {
        return Err(SimulationError::MissingPropertyValue {
            loan_type: request.loan_type,
            property_value: request.property_value,
        });
    }

    Ok(ValidatedRequest {
        product,
        request,
        collateral_value,
    })
}
