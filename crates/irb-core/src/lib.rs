pub mod error;
pub mod types;

#[cfg(feature = "capital")]
pub mod capital;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use error::IrbError;
pub use types::*;

/// Standard result type for all engine operations
pub type IrbResult<T> = Result<T, IrbError>;
