//! # Otter Host
//!
//! Host object model for native proxies: values, property keys and
//! descriptors, a traced heap of ordinary and proxy objects, and the
//! [`Context`] dispatcher that routes object operations to a proxy's
//! [`ProxyHandler`].

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod context;
pub mod convert;
pub mod error;
pub mod gc;
pub mod object;
pub mod proxy;
pub mod value;

pub use config::HostConfig;
pub use context::Context;
pub use error::{VmError, VmResult};
pub use gc::{GcRef, HeapObject, HeapStats};
pub use object::{
    JsObject, ObjectOpResult, OpFailure, Property, PropertyAttributes, PropertyDescriptor,
    PropertyKey,
};
pub use proxy::{PrototypeLookup, ProxyHandler, ProxyObject, ProxyPrivate};
pub use value::{SymbolId, Value};
