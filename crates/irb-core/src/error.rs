use thiserror::Error;

#[derive(Debug, Error)]
pub enum IrbError {
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Shape mismatch: {field} has length {actual}, expected {expected}")]
    ShapeMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("Numeric instability in {context} (value: {value})")]
    NumericInstability { context: String, value: f64 },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for IrbError {
    fn from(e: serde_json::Error) -> Self {
        IrbError::SerializationError(e.to_string())
    }
}
