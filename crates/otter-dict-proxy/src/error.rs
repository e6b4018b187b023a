//! Adapter error types

use otter_foreign::{ForeignError, ForeignKey};
use otter_host::VmError;
use thiserror::Error;

/// Errors raised by the foreign-mapping proxy.
///
/// Converted into [`VmError::Handler`] on the way out of a trap, so the
/// host sees a pending exception and callers can downcast back to this
/// type with [`VmError::handler_error`].
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Symbol or void property key
    #[error("TypeError: foreign mappings only accept string and index property keys")]
    UnsupportedIdentifier,

    /// The foreign store refused a mutation
    #[error("StoreMutationError: {op} of {key} failed: {source}")]
    StoreMutation {
        /// Operation name
        op: &'static str,
        /// Foreign repr of the key
        key: String,
        /// The foreign exception
        #[source]
        source: ForeignError,
    },

    /// A value has no representation on the other side
    #[error("ConversionError: {0}")]
    Conversion(String),

    /// The proxy's foreign mapping was already released
    #[error("foreign mapping was released by finalization")]
    Finalized,

    /// Host error raised while serving a trap
    #[error(transparent)]
    Host(#[from] VmError),
}

impl BridgeError {
    /// Create a conversion error
    pub fn conversion(msg: impl Into<String>) -> Self {
        Self::Conversion(msg.into())
    }

    /// Create a store mutation error
    pub fn store(op: &'static str, key: &ForeignKey, source: ForeignError) -> Self {
        Self::StoreMutation {
            op,
            key: key.to_string(),
            source,
        }
    }

    /// Whether this is a store mutation error
    pub fn is_store_mutation(&self) -> bool {
        matches!(self, Self::StoreMutation { .. })
    }
}

impl From<BridgeError> for VmError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::Host(err) => err,
            other => VmError::handler(other),
        }
    }
}

/// Result type for adapter operations
pub type BridgeResult<T> = std::result::Result<T, BridgeError>;
