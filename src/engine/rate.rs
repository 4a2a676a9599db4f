use crate::core::risk_band::RateAdjustment;
use crate::engine::amortization::level_payment;
use crate::engine::config::EngineConfig;
use crate::engine::error::SimulationError;
use crate::engine::summary::{dti_percent, ltv_percent};
use crate::engine::validator::ValidatedRequest;
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The risk band chosen for a request and the rate it yields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRate {
    pub tier: String,
    pub adjustment: RateAdjustment,
    /// Annual percentage rate after adjustment, never negative.
    pub annual_rate: Decimal,
    /// Band selections performed before settling.
    pub passes: u32,
}

/// Picks the risk band for a validated request.
///
/// The first pass estimates DTI with the payment at the product's base
/// rate. Each further pass re-estimates DTI at the rate the previous band
/// produced, stopping once the selection no longer changes. If it keeps
/// changing, the most expensive band seen wins.
pub struct RateResolver {
    max_passes: u32,
    ratio_scale: u32,
}

impl RateResolver {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            max_passes: config.band_refinement_passes.max(1),
            ratio_scale: config.ratio_scale,
        }
    }

    pub fn resolve(&self, validated: &ValidatedRequest<'_>) -> Result<ResolvedRate, SimulationError> {
        let product = validated.product;
        let request = validated.request;

        let ltv = validated
            .collateral_value
            .map(|value| ltv_percent(request.loan_amount, value, self.ratio_scale))
            .transpose()?;

        let mut rate = product.base_rate;
        let mut visited: Vec<ResolvedRate> = Vec::new();

        for pass in 1..=self.max_passes {
            let payment = level_payment(request.loan_amount, rate, request.loan_term_months)?;
            let dti = dti_percent(payment, request.income, self.ratio_scale)?;
            let band = product.risk_bands.select(dti, ltv);

            if let Some(previous) = visited.last() {
                if previous.tier == band.tier {
                    debug!(
                        "risk band '{}' stable after {} passes (dti {}%)",
                        band.tier, pass, dti
                    );
                    return Ok(ResolvedRate {
                        passes: pass,
                        ..previous.clone()
                    });
                }
            }

            let mut annual_rate = band.adjustment.apply(product.base_rate).ok_or(
                SimulationError::NumericFailure {
                    context: "risk band rate adjustment",
                },
            )?;
            if annual_rate < Decimal::ZERO {
                warn!(
                    "risk band '{}' drives product {} rate to {}%, clamping to 0",
                    band.tier, product.id, annual_rate
                );
                annual_rate = Decimal::ZERO;
            }
            debug!(
                "pass {}: dti {}%, ltv {:?} -> band '{}' at {}%",
                pass, dti, ltv, band.tier, annual_rate
            );

            visited.push(ResolvedRate {
                tier: band.tier.clone(),
                adjustment: band.adjustment,
                annual_rate,
                passes: pass,
            });
            rate = annual_rate;
        }

        visited
            .into_iter()
            .max_by(|a, b| a.annual_rate.cmp(&b.annual_rate))
            .ok_or(SimulationError::NumericFailure {
                context: "risk band selection",
            })
    }
}
