//! Validation error types

use std::fmt;

/// Validation error for request input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// Value doesn't match the required format (e.g., positive id)
    InvalidFormat { field: &'static str, reason: &'static str },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "field {} is required", field),
            Self::TooLong { field, max } => {
                write!(f, "field {} must be at most {} characters", field, max)
            }
            Self::InvalidFormat { field, reason } => {
                write!(f, "field {} is invalid: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ValidationError {}
