//! Foreign values and hashable keys

use std::fmt;
use std::sync::Arc;

use crate::dict::DictRef;
use crate::error::ForeignError;

/// A foreign runtime value.
///
/// `Dict` is a strong reference: cloning the value increments the mapping's
/// reference count, dropping it decrements.
#[derive(Clone, Debug)]
pub enum ForeignValue {
    /// The foreign "no value" singleton
    None,
    /// Explicit null sentinel, distinct from `None`
    Null,
    /// Boolean
    Bool(bool),
    /// 64-bit integer
    Int(i64),
    /// Double
    Float(f64),
    /// String
    Str(Arc<str>),
    /// Ordered mapping
    Dict(DictRef),
}

impl ForeignValue {
    /// Create a string value
    pub fn str(s: &str) -> Self {
        Self::Str(Arc::from(s))
    }

    /// String contents, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Mapping, if this is one
    pub fn as_dict(&self) -> Option<&DictRef> {
        match self {
            Self::Dict(d) => Some(d),
            _ => None,
        }
    }
}

impl PartialEq for ForeignValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            // Mappings compare by identity
            (Self::Dict(a), Self::Dict(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for ForeignValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Null => write!(f, "null"),
            Self::Bool(true) => write!(f, "True"),
            Self::Bool(false) => write!(f, "False"),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{:?}", x),
            Self::Str(s) => write!(f, "'{}'", s),
            Self::Dict(d) => write!(f, "<dict of {} items>", d.len()),
        }
    }
}

impl From<bool> for ForeignValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for ForeignValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for ForeignValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for ForeignValue {
    fn from(s: &str) -> Self {
        Self::str(s)
    }
}

impl From<DictRef> for ForeignValue {
    fn from(d: DictRef) -> Self {
        Self::Dict(d)
    }
}

impl From<ForeignKey> for ForeignValue {
    fn from(key: ForeignKey) -> Self {
        key.to_value()
    }
}

/// A hashable foreign value, usable as a mapping key.
///
/// Floats are keyed by their bit pattern after folding `-0.0` into `0.0`
/// and every NaN into one canonical NaN.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ForeignKey {
    /// `None`
    None,
    /// Null sentinel
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float bits
    Float(u64),
    /// String
    Str(Arc<str>),
}

impl ForeignKey {
    /// Create a string key
    pub fn str(s: &str) -> Self {
        Self::Str(Arc::from(s))
    }

    /// Create a float key
    pub fn float(x: f64) -> Self {
        let canonical = if x == 0.0 {
            0.0
        } else if x.is_nan() {
            f64::NAN
        } else {
            x
        };
        Self::Float(canonical.to_bits())
    }

    /// String contents, if this is a string key
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The key as a value
    pub fn to_value(&self) -> ForeignValue {
        match self {
            Self::None => ForeignValue::None,
            Self::Null => ForeignValue::Null,
            Self::Bool(b) => ForeignValue::Bool(*b),
            Self::Int(i) => ForeignValue::Int(*i),
            Self::Float(bits) => ForeignValue::Float(f64::from_bits(*bits)),
            Self::Str(s) => ForeignValue::Str(s.clone()),
        }
    }
}

impl TryFrom<ForeignValue> for ForeignKey {
    type Error = ForeignError;

    fn try_from(value: ForeignValue) -> Result<Self, Self::Error> {
        match value {
            ForeignValue::None => Ok(Self::None),
            ForeignValue::Null => Ok(Self::Null),
            ForeignValue::Bool(b) => Ok(Self::Bool(b)),
            ForeignValue::Int(i) => Ok(Self::Int(i)),
            ForeignValue::Float(x) => Ok(Self::float(x)),
            ForeignValue::Str(s) => Ok(Self::Str(s)),
            ForeignValue::Dict(_) => Err(ForeignError::type_error("unhashable type: 'dict'")),
        }
    }
}

impl From<&str> for ForeignKey {
    fn from(s: &str) -> Self {
        Self::str(s)
    }
}

impl From<i64> for ForeignKey {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl fmt::Display for ForeignKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}
