//! Basic loan simulation example.
//!
//! Prices one request per standard product and shows what happens when a
//! request breaks a product rule.

use loan_simulator::prelude::*;
use rust_decimal_macros::dec;

fn main() {
    println!("╔══════════════════════════════════════════╗");
    println!("║  loan-simulator: Basic Simulation        ║");
    println!("╚══════════════════════════════════════════╝\n");

    let catalog = ProductCatalog::with_defaults();
    let engine = SimulationEngine::default();

    // --- Scenario 1: Home loan ---
    println!("━━━ Scenario 1: Home Loan ━━━\n");

    let home = SimulationRequest::new(ProductId::new(1), LoanType::Home, dec!(200_000), 240, dec!(60_000))
        .with_property_value(dec!(250_000));
    match engine.simulate_from_catalog(&catalog, &home) {
        Ok(result) => println!("{}", result),
        Err(err) => println!("Rejected: {}\n", err),
    }

    // --- Scenario 2: Personal loan, no collateral ---
    println!("━━━ Scenario 2: Personal Loan ━━━\n");

    let personal = SimulationRequest::new(ProductId::new(3), LoanType::Personal, dec!(12_000), 36, dec!(48_000));
    match engine.simulate_from_catalog(&catalog, &personal) {
        Ok(result) => {
            println!("Rate:    {:.2}% ({})", result.interest_rate(), result.risk_tier());
            println!("Payment: {:.2}", result.monthly_payment());
            println!("Fee:     {:.2}", result.origination_fee());
            println!("APR:     {:.2}%", result.apr());
            println!("LTV:     {:?}\n", result.ltv_ratio());
        }
        Err(err) => println!("Rejected: {}\n", err),
    }

    // --- Scenario 3: Rejections ---
    println!("━━━ Scenario 3: Rejections ━━━\n");

    let rejected = [
        SimulationRequest::new(ProductId::new(2), LoanType::Vehicle, dec!(2_000), 36, dec!(40_000))
            .with_property_value(dec!(5_000)),
        SimulationRequest::new(ProductId::new(2), LoanType::Vehicle, dec!(30_000), 36, dec!(40_000)),
        SimulationRequest::new(ProductId::new(1), LoanType::Home, dec!(400_000), 360, dec!(30_000))
            .with_property_value(dec!(600_000)),
    ];
    for request in &rejected {
        match engine.simulate_from_catalog(&catalog, request) {
            Ok(_) => println!("  accepted (unexpected)"),
            Err(err) => println!(
                "  {:<22} field={:<16} {}",
                err.kind(),
                err.field().unwrap_or("-"),
                err
            ),
        }
    }
}
