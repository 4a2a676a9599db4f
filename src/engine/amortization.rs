use crate::engine::error::SimulationError;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Decimal places the level payment is truncated to. Truncating (rather
/// than rounding) keeps the remainder non-negative, so it always lands in
/// the final installment.
const PAYMENT_SCALE: u32 = 10;

/// Annual percentage rate to monthly fraction: 6% -> 0.005.
pub fn monthly_rate(annual_rate: Decimal) -> Decimal {
    annual_rate / dec!(1200)
}

/// Fixed monthly payment that repays `principal` over `term_months` at
/// `annual_rate` percent.
///
/// # Examples
///
/// ```
/// use loan_simulator::engine::amortization::level_payment;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(level_payment(dec!(12_000), dec!(0), 12).unwrap(), dec!(1000));
/// let payment = level_payment(dec!(100_000), dec!(6), 360).unwrap();
/// assert_eq!(payment.round_dp(2), dec!(599.55));
/// ```
pub fn level_payment(
    principal: Decimal,
    annual_rate: Decimal,
    term_months: u32,
) -> Result<Decimal, SimulationError> {
    let overflow = SimulationError::NumericFailure {
        context: "level payment",
    };
    let i = monthly_rate(annual_rate);

    let payment = if i.is_zero() {
        principal.checked_div(Decimal::from(term_months))
    } else {
        (Decimal::ONE + i)
            .checked_powi(i64::from(term_months))
            .and_then(|growth| {
                principal
                    .checked_mul(i)?
                    .checked_mul(growth)?
                    .checked_div(growth - Decimal::ONE)
            })
    }
    .ok_or(overflow)?;

    Ok(payment.round_dp_with_strategy(PAYMENT_SCALE, RoundingStrategy::ToZero))
}

/// One month of an amortization schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationEntry {
    pub month: u32,
    pub payment: Decimal,
    pub principal: Decimal,
    pub interest: Decimal,
    /// Outstanding balance after this month's payment.
    pub balance: Decimal,
}

/// A complete month-by-month repayment plan.
///
/// The final installment absorbs any remainder, so the last balance is
/// exactly zero and the principal parts add up to the amount borrowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AmortizationSchedule {
    entries: Vec<AmortizationEntry>,
}

impl AmortizationSchedule {
    /// Build the schedule for a fixed-rate, fixed-payment loan.
    ///
    /// # Examples
    ///
    /// ```
    /// use loan_simulator::engine::amortization::AmortizationSchedule;
    /// use rust_decimal::Decimal;
    /// use rust_decimal_macros::dec;
    ///
    /// let schedule = AmortizationSchedule::build(dec!(10_000), dec!(5), 24).unwrap();
    /// assert_eq!(schedule.len(), 24);
    /// assert_eq!(schedule.final_balance(), Decimal::ZERO);
    /// ```
    pub fn build(
        principal: Decimal,
        annual_rate: Decimal,
        term_months: u32,
    ) -> Result<Self, SimulationError> {
        let i = monthly_rate(annual_rate);
        let payment = level_payment(principal, annual_rate, term_months)?;

        let mut entries = Vec::with_capacity(term_months as usize);
        let mut balance = principal;

        for month in 1..=term_months {
            let interest = balance
                .checked_mul(i)
                .ok_or(SimulationError::NumericFailure {
                    context: "monthly interest",
                })?;

            if month == term_months {
                entries.push(AmortizationEntry {
                    month,
                    payment: balance + interest,
                    principal: balance,
                    interest,
                    balance: Decimal::ZERO,
                });
                break;
            }

            let principal_part = payment - interest;
            if principal_part <= Decimal::ZERO {
                return Err(SimulationError::NumericFailure {
                    context: "a payment that amortizes the balance",
                });
            }
            balance -= principal_part;

            entries.push(AmortizationEntry {
                month,
                payment,
                principal: principal_part,
                interest,
                balance,
            });
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[AmortizationEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AmortizationEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The level payment (first installment).
    pub fn monthly_payment(&self) -> Decimal {
        self.entries
            .first()
            .map(|e| e.payment)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn total_payment(&self) -> Decimal {
        self.entries.iter().map(|e| e.payment).sum()
    }

    pub fn total_interest(&self) -> Decimal {
        self.entries.iter().map(|e| e.interest).sum()
    }

    pub fn total_principal(&self) -> Decimal {
        self.entries.iter().map(|e| e.principal).sum()
    }

    pub fn final_balance(&self) -> Decimal {
        self.entries
            .last()
            .map(|e| e.balance)
            .unwrap_or(Decimal::ZERO)
    }

    /// Down-sampled entries for charting: every month up to five years,
    /// then quarterly, half-yearly and yearly as the term grows.
    pub fn sample_points(&self) -> Vec<&AmortizationEntry> {
        let step = match self.entries.len() {
            0..=60 => 1,
            61..=120 => 3,
            121..=240 => 6,
            _ => 12,
        };
        self.entries.iter().step_by(step).collect()
    }
}

impl<'a> IntoIterator for &'a AmortizationSchedule {
    type Item = &'a AmortizationEntry;
    type IntoIter = std::slice::Iter<'a, AmortizationEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
