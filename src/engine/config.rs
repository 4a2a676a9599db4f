use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Tunables for the simulation pipeline.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use loan_simulator::engine::config::EngineConfig;
///
/// let config = EngineConfig::from_json(r#"{ "apr_max_iterations": 50 }"#).unwrap();
/// assert_eq!(config.apr_max_iterations, 50);
/// assert_eq!(config.ratio_scale, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Newton step size (monthly rate) below which the APR is accepted.
    pub apr_tolerance: Decimal,
    /// Newton iterations allowed before the APR is reported as failed.
    pub apr_max_iterations: u32,
    /// Rate-resolution passes allowed before settling on the most conservative band seen.
    pub band_refinement_passes: u32,
    /// Decimal places LTV and DTI are rounded to.
    pub ratio_scale: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            apr_tolerance: dec!(0.000001),
            apr_max_iterations: 100,
            band_refinement_passes: 4,
            ratio_scale: 2,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
