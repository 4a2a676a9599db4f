use loan_simulator::core::loan_type::LoanType;
use loan_simulator::core::product::{LoanProduct, ProductId};
use loan_simulator::core::request::SimulationRequest;
use loan_simulator::core::risk_band::RiskBandTable;
use loan_simulator::engine::amortization::AmortizationSchedule;
use loan_simulator::simulate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Generate a principal between 1,000 and 1,000,000 with cents.
fn arb_principal() -> impl Strategy<Value = Decimal> {
    (100_000i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Generate an annual rate between 0% and 25% in basis points.
fn arb_rate() -> impl Strategy<Value = Decimal> {
    (0i64..=2_500i64).prop_map(|bps| Decimal::new(bps, 2))
}

/// Generate a term of 1 to 30 years in months.
fn arb_term() -> impl Strategy<Value = u32> {
    1u32..=360u32
}

/// Generate an origination fee between 0% and 5%.
fn arb_fee_percent() -> impl Strategy<Value = Decimal> {
    (0i64..=500i64).prop_map(|bps| Decimal::new(bps, 2))
}

/// A personal product wide enough to accept every generated request.
fn open_product(base_rate: Decimal, fee_percent: Decimal) -> LoanProduct {
    LoanProduct {
        id: ProductId::new(1),
        name: "Open".into(),
        loan_type: LoanType::Personal,
        min_amount: dec!(1),
        max_amount: dec!(10_000_000),
        min_term_months: 1,
        max_term_months: 360,
        base_rate,
        max_ltv: None,
        max_dti: dec!(1_000_000),
        origination_fee_percent: fee_percent,
        risk_bands: RiskBandTable::flat(),
        is_active: true,
    }
}

fn request(principal: Decimal, term: u32) -> SimulationRequest {
    SimulationRequest::new(ProductId::new(1), LoanType::Personal, principal, term, dec!(1_000_000))
}

proptest! {
    // ===================================================================
    // INVARIANT 1: The loan is exactly repaid.
    //
    // The principal parts add up to the amount borrowed, and the balance
    // after the final installment is exactly zero.
    // ===================================================================
    #[test]
    fn principal_is_fully_repaid(
        principal in arb_principal(),
        rate in arb_rate(),
        term in arb_term(),
    ) {
        let schedule = AmortizationSchedule::build(principal, rate, term).unwrap();
        prop_assert_eq!(schedule.len(), term as usize);
        prop_assert_eq!(schedule.final_balance(), Decimal::ZERO);
        prop_assert!(
            (schedule.total_principal() - principal).abs() <= dec!(0.01),
            "principal parts sum to {}, borrowed {}",
            schedule.total_principal(),
            principal
        );
    }

    // ===================================================================
    // INVARIANT 2: Totals reconcile with the schedule.
    //
    // total_payment is the sum of the installments; total_interest is
    // what was paid beyond the principal.
    // ===================================================================
    #[test]
    fn totals_match_schedule(
        principal in arb_principal(),
        rate in arb_rate(),
        term in arb_term(),
        fee in arb_fee_percent(),
    ) {
        let result = simulate(&open_product(rate, fee), &request(principal, term)).unwrap();
        let schedule = result.amortization();

        let payments: Decimal = schedule.iter().map(|e| e.payment).sum();
        prop_assert_eq!(result.total_payment(), payments);
        prop_assert_eq!(result.total_interest(), result.total_payment() - principal);
        prop_assert!((result.total_interest() - schedule.total_interest()).abs() <= dec!(0.01));
    }

    // ===================================================================
    // INVARIANT 3: The schedule moves in one direction.
    //
    // At a constant rate the balance only falls, interest never grows,
    // and the principal share never shrinks, final month included.
    // ===================================================================
    #[test]
    fn schedule_is_monotone(
        principal in arb_principal(),
        rate in arb_rate(),
        term in 2u32..=360u32,
    ) {
        let schedule = AmortizationSchedule::build(principal, rate, term).unwrap();
        for pair in schedule.entries().windows(2) {
            prop_assert!(pair[1].balance < pair[0].balance);
            prop_assert!(pair[1].interest <= pair[0].interest);
            prop_assert!(
                pair[1].principal >= pair[0].principal,
                "principal fell from {} to {} in month {}",
                pair[0].principal,
                pair[1].principal,
                pair[1].month
            );
        }
    }

    // ===================================================================
    // INVARIANT 4: Fees never make a loan look cheaper.
    //
    // With a non-negative origination fee the APR is at least the
    // nominal interest rate.
    // ===================================================================
    #[test]
    fn apr_is_at_least_nominal_rate(
        principal in arb_principal(),
        rate in arb_rate(),
        term in arb_term(),
        fee in arb_fee_percent(),
    ) {
        let result = simulate(&open_product(rate, fee), &request(principal, term)).unwrap();
        prop_assert!(
            result.apr() >= result.interest_rate() - dec!(0.0001),
            "apr {} below rate {}",
            result.apr(),
            result.interest_rate()
        );
    }

    // ===================================================================
    // INVARIANT 5: Simulation is a pure function.
    //
    // The same product and request always serialize to the same bytes.
    // ===================================================================
    #[test]
    fn simulation_is_deterministic(
        principal in arb_principal(),
        rate in arb_rate(),
        term in arb_term(),
        fee in arb_fee_percent(),
    ) {
        let product = open_product(rate, fee);
        let req = request(principal, term);
        let first = serde_json::to_string(&simulate(&product, &req).unwrap()).unwrap();
        let second = serde_json::to_string(&simulate(&product, &req).unwrap()).unwrap();
        prop_assert_eq!(first, second);
    }

    // ===================================================================
    // INVARIANT 6: Out-of-range amounts never produce a schedule.
    // ===================================================================
    #[test]
    fn out_of_range_amount_is_rejected(
        excess in 1i64..1_000_000i64,
        term in arb_term(),
    ) {
        let product = open_product(dec!(5), Decimal::ZERO);
        let amount = product.max_amount + Decimal::from(excess);
        let err = simulate(&product, &request(amount, term)).unwrap_err();
        prop_assert_eq!(err.kind(), "AmountOutOfRange");
    }
}
