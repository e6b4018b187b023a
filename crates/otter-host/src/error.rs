//! Host runtime error types

use thiserror::Error;

/// Errors raised by the host object protocol.
///
/// A `VmError` returned from a trap is the host's pending exception: the
/// dispatcher surfaces it to the caller unchanged.
#[derive(Debug, Error)]
pub enum VmError {
    /// Type error (e.g., failed strict-mode assignment)
    #[error("TypeError: {0}")]
    TypeError(String),

    /// Internal error
    #[error("InternalError: {0}")]
    InternalError(String),

    /// Error raised by a native proxy handler, kept with its concrete type
    #[error(transparent)]
    Handler(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl VmError {
    /// Create a type error
    pub fn type_error(msg: impl Into<String>) -> Self {
        Self::TypeError(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    /// Wrap an error raised by a proxy handler
    pub fn handler<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Handler(Box::new(err))
    }

    /// Borrow the handler error as `E`, if this is one
    pub fn handler_error<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            Self::Handler(err) => err.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// Whether this is a `TypeError`
    pub fn is_type_error(&self) -> bool {
        matches!(self, Self::TypeError(_))
    }
}

/// Result type for host operations
pub type VmResult<T> = std::result::Result<T, VmError>;
