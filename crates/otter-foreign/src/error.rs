//! Foreign runtime exceptions

use thiserror::Error;

/// An exception raised by the foreign runtime
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForeignError {
    /// Missing mapping key
    #[error("KeyError: {0}")]
    KeyError(String),

    /// Operation not supported for the operand type
    #[error("TypeError: {0}")]
    TypeError(String),
}

impl ForeignError {
    /// Create a key error for `key`'s repr
    pub fn key_error(key: impl std::fmt::Display) -> Self {
        Self::KeyError(key.to_string())
    }

    /// Create a type error
    pub fn type_error(msg: impl Into<String>) -> Self {
        Self::TypeError(msg.into())
    }
}

/// Result type for foreign operations
pub type ForeignResult<T> = std::result::Result<T, ForeignError>;
