pub mod catalog;
pub mod loan_type;
pub mod product;
pub mod request;
pub mod risk_band;
