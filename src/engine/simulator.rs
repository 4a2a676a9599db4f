use crate::core::catalog::ProductCatalog;
use crate::core::loan_type::LoanType;
use crate::core::product::{LoanProduct, ProductId};
use crate::core::request::SimulationRequest;
use crate::engine::amortization::AmortizationSchedule;
use crate::engine::config::EngineConfig;
use crate::engine::error::SimulationError;
use crate::engine::rate::RateResolver;
use crate::engine::summary::Summarizer;
use crate::engine::validator::validate;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use serde::Serialize;

/// Outcome of an accepted simulation.
///
/// Built once by [`SimulationEngine::simulate`] and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationResult {
    product_id: ProductId,
    loan_type: LoanType,
    loan_amount: Decimal,
    loan_term_months: u32,
    /// Annual rate after risk-band adjustment.
    interest_rate: Decimal,
    risk_tier: String,
    monthly_payment: Decimal,
    total_payment: Decimal,
    total_interest: Decimal,
    origination_fee: Decimal,
    apr: Decimal,
    ltv_ratio: Option<Decimal>,
    dti_ratio: Decimal,
    amortization: AmortizationSchedule,
}

impl SimulationResult {
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn loan_type(&self) -> LoanType {
        self.loan_type
    }

    pub fn loan_amount(&self) -> Decimal {
        self.loan_amount
    }

    pub fn loan_term_months(&self) -> u32 {
        self.loan_term_months
    }

    /// Resolved annual interest rate, in percent.
    pub fn interest_rate(&self) -> Decimal {
        self.interest_rate
    }

    /// Name of the risk band that priced the loan.
    pub fn risk_tier(&self) -> &str {
        &self.risk_tier
    }

    pub fn monthly_payment(&self) -> Decimal {
        self.monthly_payment
    }

    pub fn total_payment(&self) -> Decimal {
        self.total_payment
    }

    pub fn total_interest(&self) -> Decimal {
        self.total_interest
    }

    pub fn origination_fee(&self) -> Decimal {
        self.origination_fee
    }

    /// Effective annual rate including the origination fee, in percent.
    pub fn apr(&self) -> Decimal {
        self.apr
    }

    /// Loan-to-value in percent; `None` when no collateral was given.
    pub fn ltv_ratio(&self) -> Option<Decimal> {
        self.ltv_ratio
    }

    pub fn dti_ratio(&self) -> Decimal {
        self.dti_ratio
    }

    pub fn amortization(&self) -> &AmortizationSchedule {
        &self.amortization
    }
}

impl std::fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Loan Simulation ===")?;
        writeln!(f, "Product:          {} ({})", self.product_id, self.loan_type)?;
        writeln!(f, "Loan Amount:      {:.2}", self.loan_amount)?;
        writeln!(f, "Term:             {} months", self.loan_term_months)?;
        writeln!(
            f,
            "Interest Rate:    {:.2}% ({})",
            self.interest_rate, self.risk_tier
        )?;
        writeln!(f, "Monthly Payment:  {:.2}", self.monthly_payment)?;
        writeln!(f, "Total Payment:    {:.2}", self.total_payment)?;
        writeln!(f, "Total Interest:   {:.2}", self.total_interest)?;
        writeln!(f, "Origination Fee:  {:.2}", self.origination_fee)?;
        writeln!(f, "APR:              {:.2}%", self.apr)?;
        match self.ltv_ratio {
            Some(ltv) => writeln!(f, "LTV:              {:.2}%", ltv)?,
            None => writeln!(f, "LTV:              n/a")?,
        }
        writeln!(f, "DTI:              {:.2}%", self.dti_ratio)?;

        writeln!(f, "\nMonth     Payment   Principal    Interest       Balance")?;
        for entry in self.amortization.sample_points() {
            writeln!(
                f,
                "{:>5} {:>11.2} {:>11.2} {:>11.2} {:>13.2}",
                entry.month, entry.payment, entry.principal, entry.interest, entry.balance
            )?;
        }
        Ok(())
    }
}

/// Runs the simulation pipeline:
/// validate, resolve rate, build amortization, summarize.
///
/// Holds only configuration, so one engine can be shared freely between
/// threads.
///
/// # Examples
///
/// ```
/// use loan_simulator::prelude::*;
/// use rust_decimal_macros::dec;
///
/// let catalog = ProductCatalog::with_defaults();
/// let request = SimulationRequest::new(ProductId::new(3), LoanType::Personal, dec!(10_000), 36, dec!(60_000));
///
/// let result = SimulationEngine::default()
///     .simulate_from_catalog(&catalog, &request)
///     .unwrap();
/// assert_eq!(result.amortization().len(), 36);
/// assert_eq!(result.ltv_ratio(), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimulationEngine {
    config: EngineConfig,
}

impl SimulationEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Simulate `request` against `product`.
    ///
    /// Stops at the first failing stage; no partial result is ever
    /// returned.
    pub fn simulate(
        &self,
        product: &LoanProduct,
        request: &SimulationRequest,
    ) -> Result<SimulationResult, SimulationError> {
        match self.run(product, request) {
            Ok(result) => {
                info!(
                    "simulation accepted: product {} amount {} over {} months at {}% (apr {:.4}%)",
                    result.product_id,
                    result.loan_amount,
                    result.loan_term_months,
                    result.interest_rate,
                    result.apr
                );
                Ok(result)
            }
            Err(err) => {
                warn!(
                    "simulation rejected for product {}: {}",
                    request.product_id, err
                );
                Err(err)
            }
        }
    }

    /// Look the product up in `catalog`, then simulate.
    ///
    /// Unknown and inactive products both report `ProductUnavailable`.
    pub fn simulate_from_catalog(
        &self,
        catalog: &ProductCatalog,
        request: &SimulationRequest,
    ) -> Result<SimulationResult, SimulationError> {
        let product = catalog.active(request.product_id).ok_or_else(|| {
            warn!("product {} is not available", request.product_id);
            SimulationError::ProductUnavailable {
                product_id: request.product_id,
            }
        })?;
        self.simulate(product, request)
    }

    fn run(
        &self,
        product: &LoanProduct,
        request: &SimulationRequest,
    ) -> Result<SimulationResult, SimulationError> {
        let validated = validate(product, request)?;
        debug!("request validated against product {}", product.id);

        let resolved = RateResolver::new(&self.config).resolve(&validated)?;
        debug!(
            "rate resolved: band '{}' at {}% after {} passes",
            resolved.tier, resolved.annual_rate, resolved.passes
        );

        let schedule = AmortizationSchedule::build(
            request.loan_amount,
            resolved.annual_rate,
            request.loan_term_months,
        )?;
        debug!("amortization built: {} installments", schedule.len());

        let summary = Summarizer::new(&self.config).summarize(&validated, &schedule)?;

        Ok(SimulationResult {
            product_id: product.id,
            loan_type: request.loan_type,
            loan_amount: request.loan_amount,
            loan_term_months: request.loan_term_months,
            interest_rate: resolved.annual_rate,
            risk_tier: resolved.tier,
            monthly_payment: schedule.monthly_payment(),
            total_payment: summary.total_payment,
            total_interest: summary.total_interest,
            origination_fee: summary.origination_fee,
            apr: summary.apr,
            ltv_ratio: summary.ltv_ratio,
            dti_ratio: summary.dti_ratio,
            amortization: schedule,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::risk_band::RiskBandTable;
    use rust_decimal_macros::dec;

    fn home_product() -> LoanProduct {
        LoanProduct {
            id: ProductId::new(1),
            name: "Home".into(),
            loan_type: LoanType::Home,
            min_amount: dec!(10_000),
            max_amount: dec!(500_000),
            min_term_months: 12,
            max_term_months: 360,
            base_rate: dec!(3.5),
            max_ltv: Some(dec!(80)),
            max_dti: dec!(35),
            origination_fee_percent: dec!(0),
            risk_bands: RiskBandTable::flat(),
            is_active: true,
        }
    }

    fn home_request(amount: Decimal) -> SimulationRequest {
        SimulationRequest::new(ProductId::new(1), LoanType::Home, amount, 240, dec!(60_000))
            .with_property_value(dec!(250_000))
    }

    #[test]
    fn test_accepted_result_fields() {
        let engine = SimulationEngine::default();
        let result = engine.simulate(&home_product(), &home_request(dec!(200_000))).unwrap();

        assert_eq!(result.product_id(), ProductId::new(1));
        assert_eq!(result.loan_type(), LoanType::Home);
        assert_eq!(result.interest_rate(), dec!(3.5));
        assert_eq!(result.risk_tier(), "standard");
        assert_eq!(result.monthly_payment().round_dp(2), dec!(1159.92));
        assert_eq!(result.ltv_ratio(), Some(dec!(80.00)));
        assert_eq!(result.dti_ratio(), dec!(23.20));
        assert_eq!(result.amortization().len(), 240);
        assert_eq!(result.total_payment(), result.amortization().total_payment());
        assert_eq!(result.total_interest(), result.total_payment() - dec!(200_000));
    }

    #[test]
    fn test_no_fee_apr_matches_rate() {
        let result = SimulationEngine::default()
            .simulate(&home_product(), &home_request(dec!(200_000)))
            .unwrap();
        assert!((result.apr() - dec!(3.5)).abs() < dec!(0.0001));
    }

    #[test]
    fn test_rejection_is_first_failing_stage() {
        let engine = SimulationEngine::default();
        let request = SimulationRequest::new(ProductId::new(1), LoanType::Vehicle, dec!(1), 1, dec!(0));
        assert_eq!(
            engine.simulate(&home_product(), &request).unwrap_err().kind(),
            "TypeMismatch"
        );
    }

    #[test]
    fn test_catalog_lookup() {
        let mut catalog = ProductCatalog::new();
        let mut inactive = home_product();
        inactive.id = ProductId::new(7);
        inactive.is_active = false;
        catalog.insert(home_product());
        catalog.insert(inactive);

        let engine = SimulationEngine::default();
        assert!(engine
            .simulate_from_catalog(&catalog, &home_request(dec!(200_000)))
            .is_ok());

        for id in [7, 99] {
            let mut request = home_request(dec!(200_000));
            request.product_id = ProductId::new(id);
            assert_eq!(
                engine.simulate_from_catalog(&catalog, &request).unwrap_err(),
                SimulationError::ProductUnavailable {
                    product_id: ProductId::new(id)
                }
            );
        }
    }

    #[test]
    fn test_display_summary() {
        let result = SimulationEngine::default()
            .simulate(&home_product(), &home_request(dec!(200_000)))
            .unwrap();
        let text = result.to_string();
        assert!(text.contains("=== Loan Simulation ==="));
        assert!(text.contains("Monthly Payment:  1159.92"));
        assert!(text.contains("LTV:              80.00%"));
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SimulationEngine>();
        assert_send_sync::<SimulationResult>();
    }
}
