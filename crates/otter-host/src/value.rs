//! Host values
//!
//! Primitives are stored inline; objects are [`GcRef`] handles into the
//! context's heap and are only kept alive by tracing from roots.

use std::sync::Arc;

use crate::gc::GcRef;

/// Identity of a host symbol
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub(crate) u64);

impl SymbolId {
    /// Raw symbol id
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// A host value
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// `undefined`, also the canonical "no value" result of [[Get]]
    Undefined,
    /// `null`
    Null,
    /// Boolean
    Boolean(bool),
    /// IEEE 754 number
    Number(f64),
    /// String
    String(Arc<str>),
    /// Symbol
    Symbol(SymbolId),
    /// Heap object (ordinary or proxy)
    Object(GcRef),
}

impl Value {
    /// `undefined`
    pub const fn undefined() -> Self {
        Self::Undefined
    }

    /// `null`
    pub const fn null() -> Self {
        Self::Null
    }

    /// Create a boolean
    pub const fn boolean(b: bool) -> Self {
        Self::Boolean(b)
    }

    /// Create a number
    pub const fn number(n: f64) -> Self {
        Self::Number(n)
    }

    /// Create a number from an `i32`
    pub fn int32(n: i32) -> Self {
        Self::Number(f64::from(n))
    }

    /// Create a string
    pub fn string(s: &str) -> Self {
        Self::String(Arc::from(s))
    }

    /// Create an object value
    pub const fn object(obj: GcRef) -> Self {
        Self::Object(obj)
    }

    /// Is `undefined`
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Is `null`
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Is a heap object
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Object handle, if this is an object
    pub fn as_object(&self) -> Option<GcRef> {
        match self {
            Self::Object(obj) => Some(*obj),
            _ => None,
        }
    }

    /// String contents, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Number, if this is a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// `typeof` name of this value
    pub fn type_of(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null | Self::Object(_) => "object",
            Self::Boolean(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Symbol(_) => "symbol",
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::int32(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::string(s)
    }
}

impl From<GcRef> for Value {
    fn from(obj: GcRef) -> Self {
        Self::Object(obj)
    }
}
