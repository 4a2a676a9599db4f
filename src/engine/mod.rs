pub mod amortization;
pub mod apr;
pub mod config;
pub mod error;
pub mod rate;
pub mod simulator;
pub mod summary;
pub mod validator;

use crate::core::product::LoanProduct;
use crate::core::request::SimulationRequest;
use error::SimulationError;
use simulator::{SimulationEngine, SimulationResult};

/// Simulate with the default [`config::EngineConfig`].
pub fn simulate(
    product: &LoanProduct,
    request: &SimulationRequest,
) -> Result<SimulationResult, SimulationError> {
    SimulationEngine::default().simulate(product, request)
}
