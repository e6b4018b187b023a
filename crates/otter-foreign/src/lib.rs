//! # Otter Foreign
//!
//! Model of a reference-counted foreign runtime: values, hashable keys,
//! insertion-ordered mappings shared through strong references, and the
//! process-wide interpreter lock that serializes access to them.

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod dict;
pub mod error;
pub mod lock;
pub mod value;

pub use dict::DictRef;
pub use error::{ForeignError, ForeignResult};
pub use lock::{InterpreterGuard, is_locked, lock};
pub use value::{ForeignKey, ForeignValue};
