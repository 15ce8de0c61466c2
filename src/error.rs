use std::path::PathBuf;

use thiserror::Error;

/// Result type for training engine operations
pub type Result<T> = std::result::Result<T, DqnError>;

/// Main error type for the training engine
#[derive(Error, Debug)]
pub enum DqnError {
    /// Invalid dimensions for operations
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Invalid parameter or configuration value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// Sampling more transitions than the replay memory holds
    #[error("Cannot sample {requested} transitions from a replay memory holding {available}")]
    InsufficientSamples {
        requested: usize,
        available: usize,
    },

    /// An optimisation step was asked to work on zero transitions
    #[error("Empty batch: no transitions to optimise on")]
    EmptyBatch,

    /// Every transition in the batch is terminal, so there is no successor state to bootstrap from
    #[error("Batch contains no non-terminal transition")]
    NoNonTerminalTransitions,

    /// Invalid action
    #[error("Invalid action {action}: must be less than {num_actions}")]
    InvalidAction {
        action: usize,
        num_actions: usize,
    },

    /// Failure reported by the environment collaborator
    #[error("Environment error: {0}")]
    Environment(String),

    /// Failure reported by a visualisation sink
    #[error("Visualization error: {0}")]
    Visualization(String),

    /// The global tracing subscriber could not be installed
    #[error("Logging setup failed: {0}")]
    Logging(String),

    /// No stored model could be found
    #[error("No model found in {0}")]
    ModelNotFound(PathBuf),

    /// IO errors (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<bincode::Error> for DqnError {
    fn from(err: bincode::Error) -> Self {
        DqnError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for DqnError {
    fn from(err: serde_json::Error) -> Self {
        DqnError::Serialization(err.to_string())
    }
}

// Helper functions for common error patterns
impl DqnError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        DqnError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        DqnError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
