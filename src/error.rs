use std::fmt;

/// Result type for twinq operations
pub type Result<T> = std::result::Result<T, TwinqError>;

/// Main error type for the twinq library
#[derive(Debug, Clone)]
pub enum TwinqError {
    /// Invalid dimensions for operations
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Invalid parameter value
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// Empty buffer or container
    EmptyBuffer(String),

    /// IO errors (file operations)
    IoError(String),

    /// Serialization/deserialization errors
    SerializationError(String),
}

impl fmt::Display for TwinqError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TwinqError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {}, got {}", expected, actual)
            }
            TwinqError::InvalidParameter { name, reason } => {
                write!(f, "Invalid parameter '{}': {}", name, reason)
            }
            TwinqError::EmptyBuffer(msg) => write!(f, "Empty buffer: {}", msg),
            TwinqError::IoError(msg) => write!(f, "IO error: {}", msg),
            TwinqError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for TwinqError {}

impl From<std::io::Error> for TwinqError {
    fn from(err: std::io::Error) -> Self {
        TwinqError::IoError(err.to_string())
    }
}

impl From<bincode::Error> for TwinqError {
    fn from(err: bincode::Error) -> Self {
        TwinqError::SerializationError(err.to_string())
    }
}

impl From<serde_json::Error> for TwinqError {
    fn from(err: serde_json::Error) -> Self {
        TwinqError::SerializationError(err.to_string())
    }
}

// Helper functions for common error patterns
impl TwinqError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        TwinqError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        TwinqError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
