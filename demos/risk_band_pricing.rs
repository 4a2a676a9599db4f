//! Risk-band pricing example.
//!
//! Runs the same loan for applicants with different incomes and shows how
//! the selected tier, rate and APR move with the debt-to-income ratio.

use loan_simulator::core::risk_band::TierThresholds;
use loan_simulator::prelude::*;
use loan_simulator::simulation::stress_test::{generate_requests, run_batch, RequestConfig};
use rust_decimal_macros::dec;

fn main() {
    println!("╔══════════════════════════════════════════╗");
    println!("║  loan-simulator: Risk Band Pricing       ║");
    println!("╚══════════════════════════════════════════╝\n");

    let bands = RiskBandTable::from_tier_map(
        r#"{"excellent": -1.0, "good": 0, "fair": 2.0, "poor": 5.0}"#,
        &TierThresholds::default(),
    )
    .unwrap_or_else(|e| {
        eprintln!("Invalid tier map: {}", e);
        std::process::exit(1);
    });

    let product = LoanProduct {
        id: ProductId::new(3),
        name: "Personal Loan Standard".into(),
        loan_type: LoanType::Personal,
        min_amount: dec!(1_000),
        max_amount: dec!(50_000),
        min_term_months: 12,
        max_term_months: 60,
        base_rate: dec!(6.9),
        max_ltv: None,
        max_dti: dec!(43),
        origination_fee_percent: dec!(2),
        risk_bands: bands,
        is_active: true,
    };

    println!("━━━ 25,000 over 48 months ━━━\n");
    println!(
        "  {:>10}  {:>7}  {:<10} {:>7}  {:>9}  {:>7}",
        "Income", "DTI", "Tier", "Rate", "Payment", "APR"
    );

    let engine = SimulationEngine::default();
    for income in [dec!(120_000), dec!(45_000), dec!(30_000), dec!(24_000), dec!(20_000), dec!(15_000)] {
        let request = SimulationRequest::new(product.id, LoanType::Personal, dec!(25_000), 48, income);
        match engine.simulate(&product, &request) {
            Ok(result) => println!(
                "  {:>10}  {:>6.2}%  {:<10} {:>6.2}%  {:>9.2}  {:>6.2}%",
                income,
                result.dti_ratio(),
                result.risk_tier(),
                result.interest_rate(),
                result.monthly_payment(),
                result.apr()
            ),
            Err(err) => println!("  {:>10}  rejected: {}", income, err),
        }
    }

    println!("\n━━━ Stress batch ━━━\n");

    let mut catalog = ProductCatalog::new();
    catalog.insert(product.clone());
    let requests = generate_requests(
        &product,
        &RequestConfig {
            count: 1_000,
            seed: Some(42),
            ..Default::default()
        },
    );
    println!("{}", run_batch(&engine, &catalog, &requests));
}
