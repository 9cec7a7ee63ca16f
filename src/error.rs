use thiserror::Error;

/// Result type for ddqn operations
pub type Result<T> = std::result::Result<T, DdqnError>;

/// Main error type for the ddqn library
#[derive(Error, Debug)]
pub enum DdqnError {
    /// Invalid dimensions for operations
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Invalid parameter value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// Sampling from a buffer with nothing in it
    #[error("Empty buffer: {0}")]
    EmptyBuffer(String),

    /// Action index outside the action space
    #[error("Invalid action {action}: must be less than {num_actions}")]
    InvalidAction {
        action: usize,
        num_actions: usize,
    },

    /// Numerical computation errors
    #[error("Numerical error: {0}")]
    NumericalError(String),

    /// Environment collaborator failures
    #[error("Environment error: {0}")]
    Environment(String),

    /// IO errors (model files, config files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Model snapshot encoding/decoding errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration parsing errors
    #[error("Config error: {0}")]
    Config(String),
}

impl From<bincode::Error> for DdqnError {
    fn from(err: bincode::Error) -> Self {
        DdqnError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for DdqnError {
    fn from(err: serde_json::Error) -> Self {
        DdqnError::Config(err.to_string())
    }
}

// Helper functions for common error patterns
impl DdqnError {
    pub fn dimension_mismatch<E: Into<String>, A: Into<String>>(expected: E, actual: A) -> Self {
        DdqnError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<N: Into<String>, R: Into<String>>(name: N, reason: R) -> Self {
        DdqnError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
