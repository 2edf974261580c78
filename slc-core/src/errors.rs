use thiserror::Error;

/// Error type for invalid operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SLCError {
    #[error("Field `{field}` has shape {found:?}, expected {expected:?} to match the other fields")]
    ShapeMismatch {
        field: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    #[error("Invalid physical constants: {0}")]
    InvalidConstants(String),
    #[error("Could not read configuration: {0}")]
    Config(String),
}

/// Convenience type for `Result<T, SLCError>`.
pub type SLCResult<T> = Result<T, SLCError>;
