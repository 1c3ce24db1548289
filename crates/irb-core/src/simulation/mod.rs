pub mod conditional;
pub mod distribution;
pub mod monte_carlo;
