//! Annual percentage rate via Newton-Raphson on the monthly discount rate.

use crate::engine::amortization::AmortizationSchedule;
use crate::engine::config::EngineConfig;
use crate::engine::error::SimulationError;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

/// Finds the monthly rate at which the scheduled payments discount back to
/// the amount actually disbursed, then annualizes it.
#[derive(Debug, Clone, Copy)]
pub struct AprSolver {
    tolerance: Decimal,
    max_iterations: u32,
}

impl AprSolver {
    pub fn new(tolerance: Decimal, max_iterations: u32) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.apr_tolerance, config.apr_max_iterations)
    }

    /// APR as an annual percentage.
    ///
    /// `net_disbursed` is the principal minus up-front fees. The search
    /// starts from the schedule's nominal rate, which is never above the
    /// answer when fees are non-negative, so the iteration approaches the
    /// root from one side.
    pub fn solve(
        &self,
        schedule: &AmortizationSchedule,
        net_disbursed: Decimal,
    ) -> Result<Decimal, SimulationError> {
        let initial = nominal_monthly_rate(schedule);
        self.solve_from(schedule, net_disbursed, initial)
    }

    pub fn solve_from(
        &self,
        schedule: &AmortizationSchedule,
        net_disbursed: Decimal,
        initial_monthly_rate: Decimal,
    ) -> Result<Decimal, SimulationError> {
        if net_disbursed <= Decimal::ZERO || schedule.is_empty() {
            return Err(SimulationError::AprComputationFailed {
                iterations: 0,
                last_delta: net_disbursed,
            });
        }

        let mut rate = initial_monthly_rate;
        let mut last_delta = Decimal::ZERO;

        for iteration in 1..=self.max_iterations {
            let failed = SimulationError::AprComputationFailed {
                iterations: iteration,
                last_delta,
            };
            let (present_value, slope) =
                present_value_and_slope(schedule, rate).ok_or_else(|| failed.clone())?;
            if slope.is_zero() {
                return Err(failed);
            }

            let step = (present_value - net_disbursed)
                .checked_div(slope)
                .ok_or_else(|| failed.clone())?;
            let next = rate - step;
            if next <= -Decimal::ONE {
                return Err(failed);
            }

            if step.abs() < self.tolerance {
                log::debug!("APR converged after {} iterations", iteration);
                return Ok(next * dec!(1200));
            }

            rate = next;
            last_delta = step;
        }

        Err(SimulationError::AprComputationFailed {
            iterations: self.max_iterations,
            last_delta,
        })
    }
}

impl Default for AprSolver {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

/// Back out the schedule's nominal monthly rate from its first installment.
fn nominal_monthly_rate(schedule: &AmortizationSchedule) -> Decimal {
    schedule
        .entries()
        .first()
        .and_then(|first| {
            let opening_balance = first.balance + first.principal;
            first.interest.checked_div(opening_balance)
        })
        .unwrap_or(Decimal::ZERO)
}

/// Present value of the payment stream at monthly rate `rate`, and its
/// derivative with respect to `rate`.
fn present_value_and_slope(
    schedule: &AmortizationSchedule,
    rate: Decimal,
) -> Option<(Decimal, Decimal)> {
    let v = Decimal::ONE.checked_div(Decimal::ONE + rate)?;
    let mut discount = Decimal::ONE;
    let mut present_value = Decimal::ZERO;
    let mut slope = Decimal::ZERO;

    for entry in schedule {
        discount = discount.checked_mul(v)?;
        let discounted = entry.payment.checked_mul(discount)?;
        present_value = present_value.checked_add(discounted)?;
        // d/dr [p·v^m] = -m·p·v^(m+1)
        let term = discounted
            .checked_mul(Decimal::from(entry.month))?
            .checked_mul(v)?;
        slope = slope.checked_sub(term)?;
    }

    Some((present_value, slope))
}
