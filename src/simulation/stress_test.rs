//! Stress testing utilities for the simulation engine.
//!
//! Generates random requests within a product's bounds and summarizes how
//! a batch of them fares.

use crate::core::catalog::ProductCatalog;
use crate::core::product::LoanProduct;
use crate::core::request::SimulationRequest;
use crate::engine::error::SimulationError;
use crate::engine::simulator::{SimulationEngine, SimulationResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::BTreeMap;

/// Configuration for generating random requests against one product.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// Number of requests to generate.
    pub count: usize,
    /// Fixed seed for reproducible batches; `None` draws from entropy.
    pub seed: Option<u64>,
    /// Minimum annual income.
    pub min_income: Decimal,
    /// Maximum annual income.
    pub max_income: Decimal,
    /// Collateral value as a multiple of the loan amount, for secured loans.
    pub min_collateral_ratio: Decimal,
    pub max_collateral_ratio: Decimal,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            count: 100,
            seed: None,
            min_income: dec!(20_000),
            max_income: dec!(250_000),
            min_collateral_ratio: dec!(1.0),
            max_collateral_ratio: dec!(2.5),
        }
    }
}

/// Uniform draw in `[low, high]` at cent precision.
fn random_amount<R: Rng>(rng: &mut R, low: Decimal, high: Decimal) -> Decimal {
    if high <= low {
        return low;
    }
    let fraction = Decimal::new(rng.gen_range(0..=1_000_000), 6);
    (low + (high - low) * fraction)
        .round_dp_with_strategy(2, RoundingStrategy::ToZero)
        .clamp(low, high)
}

/// Generate random requests for `product`.
///
/// Amounts and terms stay inside the product's bounds; incomes and
/// collateral vary, so some requests still fail the DTI or LTV caps.
pub fn generate_requests(product: &LoanProduct, config: &RequestConfig) -> Vec<SimulationRequest> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    (0..config.count)
        .map(|_| {
            let amount = random_amount(&mut rng, product.min_amount, product.max_amount);
            let term = rng.gen_range(
                product.min_term_months..=product.max_term_months.max(product.min_term_months),
            );
            let income = random_amount(&mut rng, config.min_income, config.max_income);

            let request =
                SimulationRequest::new(product.id, product.loan_type, amount, term, income);
            if product.loan_type.requires_collateral() {
                let ratio = random_amount(
                    &mut rng,
                    config.min_collateral_ratio,
                    config.max_collateral_ratio,
                );
                request.with_property_value((amount * ratio).round_dp(2))
            } else {
                request
            }
        })
        .collect()
}

/// Acceptance and rejection counts for a batch of simulations.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    total: usize,
    accepted: usize,
    /// Rejection count per error kind.
    rejections: BTreeMap<String, usize>,
    mean_apr: Option<Decimal>,
    max_apr: Option<Decimal>,
}

impl BatchReport {
    /// Tally a sequence of simulation outcomes.
    pub fn from_outcomes<'a, I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = &'a Result<SimulationResult, SimulationError>>,
    {
        let mut report = BatchReport::default();
        let mut apr_sum = Decimal::ZERO;

        for outcome in outcomes {
            report.total += 1;
            match outcome {
                Ok(result) => {
                    report.accepted += 1;
                    apr_sum += result.apr();
                    report.max_apr = Some(match report.max_apr {
                        Some(max) => max.max(result.apr()),
                        None => result.apr(),
                    });
                }
                Err(err) => {
                    *report.rejections.entry(err.kind().to_string()).or_insert(0) += 1;
                }
            }
        }

        if report.accepted > 0 {
            report.mean_apr = Some(apr_sum / Decimal::from(report.accepted));
        }
        report
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn accepted(&self) -> usize {
        self.accepted
    }

    pub fn rejected(&self) -> usize {
        self.total - self.accepted
    }

    pub fn rejections(&self) -> &BTreeMap<String, usize> {
        &self.rejections
    }

    pub fn mean_apr(&self) -> Option<Decimal> {
        self.mean_apr
    }

    pub fn max_apr(&self) -> Option<Decimal> {
        self.max_apr
    }

    /// Accepted share of the batch, 0.0 to 1.0.
    pub fn acceptance_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.accepted as f64 / self.total as f64
    }
}

impl std::fmt::Display for BatchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Batch Report ===")?;
        writeln!(f, "Requests:   {}", self.total)?;
        writeln!(f, "Accepted:   {}", self.accepted)?;
        writeln!(f, "Rejected:   {}", self.rejected())?;
        writeln!(f, "Acceptance: {:.1}%", self.acceptance_rate() * 100.0)?;
        if let (Some(mean), Some(max)) = (self.mean_apr, self.max_apr) {
            writeln!(f, "Mean APR:   {:.2}%", mean)?;
            writeln!(f, "Max APR:    {:.2}%", max)?;
        }

        if !self.rejections.is_empty() {
            writeln!(f, "\nRejections:")?;
            for (kind, count) in &self.rejections {
                writeln!(f, "  {}: {}", kind, count)?;
            }
        }
        Ok(())
    }
}

/// Simulate every request against `catalog` and tally the outcomes.
pub fn run_batch(
    engine: &SimulationEngine,
    catalog: &ProductCatalog,
    requests: &[SimulationRequest],
) -> BatchReport {
    let outcomes: Vec<_> = requests
        .iter()
        .map(|request| engine.simulate_from_catalog(catalog, request))
        .collect();
    BatchReport::from_outcomes(&outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::product::ProductId;

    fn seeded(count: usize, seed: u64) -> RequestConfig {
        RequestConfig {
            count,
            seed: Some(seed),
            ..Default::default()
        }
    }

    #[test]
    fn test_generated_requests_respect_product_bounds() {
        let catalog = ProductCatalog::with_defaults();
        for product in catalog.active_products() {
            let requests = generate_requests(product, &seeded(200, 7));
            assert_eq!(requests.len(), 200);

            for request in &requests {
                assert_eq!(request.product_id, product.id);
                assert_eq!(request.loan_type, product.loan_type);
                assert!(product.amount_in_range(request.loan_amount));
                assert!(product.term_in_range(request.loan_term_months));
                assert!(request.income > Decimal::ZERO);
                assert_eq!(
                    request.property_value.is_some(),
                    product.loan_type.requires_collateral()
                );
            }
        }
    }

    #[test]
    fn test_seed_makes_generation_reproducible() {
        let catalog = ProductCatalog::with_defaults();
        let product = catalog.active(ProductId::new(1)).unwrap();
        assert_eq!(
            generate_requests(product, &seeded(25, 42)),
            generate_requests(product, &seeded(25, 42))
        );
    }

    #[test]
    fn test_random_batch_simulation() {
        let catalog = ProductCatalog::with_defaults();
        let engine = SimulationEngine::default();
        let mut requests = Vec::new();
        for product in catalog.active_products() {
            requests.extend(generate_requests(product, &seeded(50, 11)));
        }

        let report = run_batch(&engine, &catalog, &requests);
        assert_eq!(report.total(), 150);
        assert_eq!(
            report.accepted() + report.rejections().values().sum::<usize>(),
            report.total()
        );
        // Generated requests are always within bounds, so only the ratio
        // caps can reject them.
        for kind in report.rejections().keys() {
            assert!(kind == "DtiExceeded" || kind == "LtvExceeded", "{}", kind);
        }
        if let (Some(mean), Some(max)) = (report.mean_apr(), report.max_apr()) {
            assert!(mean <= max);
        }
    }

    #[test]
    fn test_empty_batch_report() {
        let outcomes: Vec<Result<SimulationResult, SimulationError>> = Vec::new();
        let report = BatchReport::from_outcomes(&outcomes);
        assert_eq!(report.total(), 0);
        assert_eq!(report.acceptance_rate(), 0.0);
        assert_eq!(report.mean_apr(), None);
        assert!(report.to_string().contains("Requests:   0"));
    }
}
