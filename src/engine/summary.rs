use crate::engine::amortization::AmortizationSchedule;
use crate::engine::apr::AprSolver;
use crate::engine::config::EngineConfig;
use crate::engine::error::SimulationError;
use crate::engine::validator::ValidatedRequest;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Round half away from zero and pad to exactly `scale` places.
fn round_ratio(value: Decimal, scale: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(scale);
    rounded
}

/// Loan-to-value as a percentage: `amount / collateral × 100`.
///
/// # Examples
///
/// ```
/// use loan_simulator::engine::summary::ltv_percent;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(ltv_percent(dec!(200_000), dec!(250_000), 2).unwrap(), dec!(80.00));
/// ```
pub fn ltv_percent(
    amount: Decimal,
    collateral_value: Decimal,
    scale: u32,
) -> Result<Decimal, SimulationError> {
    amount
        .checked_div(collateral_value)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|percent| round_ratio(percent, scale))
        .ok_or(SimulationError::NumericFailure {
            context: "loan-to-value ratio",
        })
}

/// Debt-to-income as a percentage: annualized payment over annual income.
pub fn dti_percent(
    monthly_payment: Decimal,
    annual_income: Decimal,
    scale: u32,
) -> Result<Decimal, SimulationError> {
    monthly_payment
        .checked_mul(MONTHS_PER_YEAR)
        .and_then(|annual| annual.checked_div(annual_income))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|percent| round_ratio(percent, scale))
        .ok_or(SimulationError::NumericFailure {
            context: "debt-to-income ratio",
        })
}

/// Cost and risk metrics derived from a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostSummary {
    pub total_payment: Decimal,
    pub total_interest: Decimal,
    pub origination_fee: Decimal,
    pub apr: Decimal,
    pub ltv_ratio: Option<Decimal>,
    pub dti_ratio: Decimal,
}

/// Derives totals and ratios, enforcing the product's DTI and LTV caps.
pub struct Summarizer<'c> {
    config: &'c EngineConfig,
}

impl<'c> Summarizer<'c> {
    pub fn new(config: &'c EngineConfig) -> Self {
        Self { config }
    }

    /// Check order: LTV cap, DTI cap, then APR convergence.
    pub fn summarize(
        &self,
        validated: &ValidatedRequest<'_>,
        schedule: &AmortizationSchedule,
    ) -> Result<CostSummary, SimulationError> {
        let product = validated.product;
        let request = validated.request;
        let scale = self.config.ratio_scale;

        let ltv_ratio = validated
            .collateral_value
            .map(|value| ltv_percent(request.loan_amount, value, scale))
            .transpose()?;
        if let (Some(ltv_ratio), Some(max_ltv)) = (ltv_ratio, product.max_ltv) {
            if ltv_ratio > max_ltv {
                return Err(SimulationError::LtvExceeded { ltv_ratio, max_ltv });
            }
        }

        let dti_ratio = dti_percent(schedule.monthly_payment(), request.income, scale)?;
        if dti_ratio > product.max_dti {
            return Err(SimulationError::DtiExceeded {
                dti_ratio,
                max_dti: product.max_dti,
            });
        }

        let origination_fee = product.origination_fee(request.loan_amount).ok_or(
            SimulationError::NumericFailure {
                context: "origination fee",
            },
        )?;
        let apr = AprSolver::from_config(self.config)
            .solve(schedule, request.loan_amount - origination_fee)?;

        let total_payment = schedule.total_payment();
        Ok(CostSummary {
            total_payment,
            total_interest: total_payment - request.loan_amount,
            origination_fee,
            apr,
            ltv_ratio,
            dti_ratio,
        })
    }
}
