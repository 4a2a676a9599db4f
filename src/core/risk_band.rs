use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use thiserror::Error;

/// How a risk band moves the product's base rate.
///
/// Rates are annual percentages, so `Additive(dec!(1.5))` turns a 4.0%
/// base rate into 5.5%, while `Multiplicative(dec!(1.5))` turns it into 6.0%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RateAdjustment {
    /// Percentage points added to the base rate (may be negative).
    Additive(Decimal),
    /// Factor the base rate is multiplied by.
    Multiplicative(Decimal),
}

impl RateAdjustment {
    /// Apply this adjustment to an annual base rate; `None` on overflow.
    pub fn apply(&self, base_rate: Decimal) -> Option<Decimal> {
        match self {
            RateAdjustment::Additive(delta) => base_rate.checked_add(*delta),
            RateAdjustment::Multiplicative(factor) => base_rate.checked_mul(*factor),
        }
    }
}

/// A risk tier: applicants whose DTI and LTV fall within the thresholds
/// get the band's rate adjustment.
///
/// A threshold of `None` means the band does not constrain that ratio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskBand {
    pub tier: String,
    /// Highest DTI (percent) admitted by this band.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_dti: Option<Decimal>,
    /// Highest LTV (percent) admitted by this band.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_ltv: Option<Decimal>,
    pub adjustment: RateAdjustment,
}

impl RiskBand {
    pub fn new(tier: impl Into<String>, adjustment: RateAdjustment) -> Self {
        Self {
            tier: tier.into(),
            max_dti: None,
            max_ltv: None,
            adjustment,
        }
    }

    pub fn with_max_dti(mut self, max_dti: Decimal) -> Self {
        self.max_dti = Some(max_dti);
        self
    }

    pub fn with_max_ltv(mut self, max_ltv: Decimal) -> Self {
        self.max_ltv = Some(max_ltv);
        self
    }

    /// Whether an applicant with the given ratios falls inside this band.
    ///
    /// Unsecured applicants have no LTV, so the LTV threshold does not apply.
    pub fn admits(&self, dti: Decimal, ltv: Option<Decimal>) -> bool {
        let dti_ok = self.max_dti.map_or(true, |max| dti <= max);
        let ltv_ok = match (self.max_ltv, ltv) {
            (Some(max), Some(ltv)) => ltv <= max,
            _ => true,
        };
        dti_ok && ltv_ok
    }

    /// Scan order: lowest DTI threshold first, then lowest LTV threshold,
    /// unconstrained thresholds last, tier name as the final tie-break.
    fn tightness_cmp(&self, other: &Self) -> Ordering {
        let key = |band: &RiskBand| {
            (
                band.max_dti.unwrap_or(Decimal::MAX),
                band.max_ltv.unwrap_or(Decimal::MAX),
            )
        };
        key(self)
            .cmp(&key(other))
            .then_with(|| self.tier.cmp(&other.tier))
    }
}

/// Ordered list of risk bands with an explicit fallback.
///
/// Bands are kept sorted tightest-first regardless of the order they were
/// supplied in, so lookups are deterministic.
///
/// # Examples
///
/// ```
/// use loan_simulator::core::risk_band::{RateAdjustment, RiskBand, RiskBandTable};
/// use rust_decimal_macros::dec;
///
/// let table = RiskBandTable::new(
///     vec![
///         RiskBand::new("good", RateAdjustment::Additive(dec!(0))).with_max_dti(dec!(30)),
///         RiskBand::new("excellent", RateAdjustment::Additive(dec!(-0.5))).with_max_dti(dec!(20)),
///     ],
///     RiskBand::new("poor", RateAdjustment::Additive(dec!(2.5))),
/// );
///
/// assert_eq!(table.select(dec!(15), None).tier, "excellent");
/// assert_eq!(table.select(dec!(25), None).tier, "good");
/// assert_eq!(table.select(dec!(45), None).tier, "poor");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawRiskBandTable")]
pub struct RiskBandTable {
    bands: Vec<RiskBand>,
    fallback: RiskBand,
}

#[derive(Deserialize)]
struct RawRiskBandTable {
    #[serde(default)]
    bands: Vec<RiskBand>,
    fallback: RiskBand,
}

impl From<RawRiskBandTable> for RiskBandTable {
    fn from(raw: RawRiskBandTable) -> Self {
        RiskBandTable::new(raw.bands, raw.fallback)
    }
}

impl RiskBandTable {
    pub fn new(mut bands: Vec<RiskBand>, fallback: RiskBand) -> Self {
        bands.sort_by(RiskBand::tightness_cmp);
        Self { bands, fallback }
    }

    /// A table with no tiers: every applicant pays the base rate.
    pub fn flat() -> Self {
        Self::new(
            Vec::new(),
            RiskBand::new("standard", RateAdjustment::Additive(Decimal::ZERO)),
        )
    }

    /// Build a table from the legacy tier map format, a JSON object of
    /// tier name to additive percentage points:
    /// `{"excellent": -0.5, "good": 0, "fair": 1.0, "poor": 2.5}`.
    ///
    /// The tier with the largest delta becomes the fallback; every other
    /// tier takes its thresholds from `thresholds`.
    pub fn from_tier_map(json: &str, thresholds: &TierThresholds) -> Result<Self, RiskBandError> {
        let tiers: BTreeMap<String, Decimal> = serde_json::from_str(json)?;

        let (fallback_name, fallback_delta) = tiers
            .iter()
            .max_by(|a, b| a.1.cmp(b.1))
            .map(|(name, delta)| (name.clone(), *delta))
            .ok_or(RiskBandError::Empty)?;

        let mut bands = Vec::with_capacity(tiers.len().saturating_sub(1));
        for (name, delta) in &tiers {
            if *name == fallback_name {
                continue;
            }
            let threshold = thresholds
                .get(name)
                .ok_or_else(|| RiskBandError::UnknownTier(name.clone()))?;
            let mut band = RiskBand::new(name.clone(), RateAdjustment::Additive(*delta))
                .with_max_dti(threshold.max_dti);
            if let Some(max_ltv) = threshold.max_ltv {
                band = band.with_max_ltv(max_ltv);
            }
            bands.push(band);
        }

        Ok(Self::new(
            bands,
            RiskBand::new(fallback_name, RateAdjustment::Additive(fallback_delta)),
        ))
    }

    /// Select the tightest band admitting the given ratios, or the fallback.
    pub fn select(&self, dti: Decimal, ltv: Option<Decimal>) -> &RiskBand {
        self.bands
            .iter()
            .find(|band| band.admits(dti, ltv))
            .unwrap_or(&self.fallback)
    }

    /// Bands in scan order, excluding the fallback.
    pub fn bands(&self) -> &[RiskBand] {
        &self.bands
    }

    /// Band used when no other band admits the ratios. Every table has
    /// one, so `select` always yields a band.
    pub fn fallback(&self) -> &RiskBand {
        &self.fallback
    }
}

impl Default for RiskBandTable {
    fn default() -> Self {
        Self::flat()
    }
}

/// Errors from building a risk band table out of a legacy tier map.
#[derive(Debug, Error)]
pub enum RiskBandError {
    #[error("malformed risk band table: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("risk band table has no tiers")]
    Empty,
    #[error("no thresholds known for risk tier '{0}'")]
    UnknownTier(String),
}

/// Thresholds attached to one named tier of a legacy tier map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierThreshold {
    pub name: String,
    pub max_dti: Decimal,
    #[serde(default)]
    pub max_ltv: Option<Decimal>,
}

/// Named tier thresholds used to interpret legacy tier maps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierThresholds(Vec<TierThreshold>);

impl TierThresholds {
    pub fn new(tiers: Vec<TierThreshold>) -> Self {
        Self(tiers)
    }

    /// Look up a tier by name, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&TierThreshold> {
        self.0.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }
}

impl Default for TierThresholds {
    fn default() -> Self {
        let tier = |name: &str, max_dti, max_ltv| TierThreshold {
            name: name.to_string(),
            max_dti,
            max_ltv: Some(max_ltv),
        };
        Self(vec![
            tier("excellent", dec!(20), dec!(60)),
            tier("good", dec!(28), dec!(70)),
            tier("fair", dec!(36), dec!(80)),
        ])
    }
}
