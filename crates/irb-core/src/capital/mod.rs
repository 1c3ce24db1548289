pub mod correlation;
pub mod engine;
pub mod maturity;
