#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Expected {expected} comma-separated fields, got {actual}")]
    FieldCount { expected: usize, actual: usize },

    #[error("Field {field} is not a non-negative integer: {value:?}")]
    InvalidField { field: &'static str, value: String },

    #[error("Validation failed: {0}")]
    Validation(String),
}
