//! # loan-simulator
//!
//! Loan simulation engine: prices a loan product for an applicant and
//! produces the full repayment plan.
//!
//! Given a [`LoanProduct`](core::product::LoanProduct) and a
//! [`SimulationRequest`](core::request::SimulationRequest), the engine
//! validates the request, picks the risk band that sets the interest
//! rate, builds the month-by-month amortization schedule and derives
//! APR, LTV and DTI. Every step is a pure computation over decimals.
//!
//! ## Architecture
//!
//! - **core** — Domain types: loan types, products, requests, risk bands, catalog
//! - **engine** — Validation, rate resolution, amortization, APR and the pipeline
//! - **simulation** — Random request generation and batch stress reports

pub mod core;
pub mod engine;
pub mod simulation;

pub use engine::simulate;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::catalog::ProductCatalog;
    pub use crate::core::loan_type::LoanType;
    pub use crate::core::product::{LoanProduct, ProductId};
    pub use crate::core::request::SimulationRequest;
    pub use crate::core::risk_band::{RateAdjustment, RiskBand, RiskBandTable};
    pub use crate::engine::amortization::{AmortizationEntry, AmortizationSchedule};
    pub use crate::engine::config::EngineConfig;
    pub use crate::engine::error::SimulationError;
    pub use crate::engine::simulator::{SimulationEngine, SimulationResult};
}
