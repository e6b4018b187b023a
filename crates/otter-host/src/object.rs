//! Property keys, descriptors, and ordinary objects

use indexmap::IndexMap;
use std::sync::Arc;

use crate::gc::GcRef;
use crate::value::{SymbolId, Value};

/// Property identifier
///
/// Strings that spell a canonical array index are always stored as
/// [`PropertyKey::Index`], so `obj[0]` and `obj["0"]` name the same key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    /// String property key
    String(Arc<str>),
    /// Integer index (0..=2^32-2)
    Index(u32),
    /// Symbol property key
    Symbol(SymbolId),
    /// The empty identifier; never names a real property
    Void,
}

/// Parse a canonical array index ("0", "17"; not "017", "-1", or "4294967295")
pub fn parse_array_index(s: &str) -> Option<u32> {
    let bytes = s.as_bytes();
    if bytes.is_empty() || bytes.len() > 10 {
        return None;
    }
    if bytes.len() > 1 && bytes[0] == b'0' {
        return None;
    }
    if !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let n: u64 = s.parse().ok()?;
    if n < u64::from(u32::MAX) {
        Some(n as u32)
    } else {
        None
    }
}

impl PropertyKey {
    /// Create a string property key, canonicalizing index-like strings
    pub fn string(s: &str) -> Self {
        match parse_array_index(s) {
            Some(i) => Self::Index(i),
            None => Self::String(Arc::from(s)),
        }
    }

    /// Create an index property key
    pub fn index(i: u32) -> Self {
        if i == u32::MAX {
            Self::String(Arc::from(i.to_string()))
        } else {
            Self::Index(i)
        }
    }

    /// Is a symbol key
    pub fn is_symbol(&self) -> bool {
        matches!(self, Self::Symbol(_))
    }

    /// Is the void identifier
    pub fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }

    /// The value this identifier stands for.
    ///
    /// Index keys come back as numbers; converting that number with ToString
    /// yields the canonical string form.
    pub fn to_value(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Index(i) => Value::Number(f64::from(*i)),
            Self::Symbol(sym) => Value::Symbol(*sym),
            Self::Void => Value::Undefined,
        }
    }
}

impl std::fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => write!(f, "{}", s),
            Self::Index(i) => write!(f, "{}", i),
            Self::Symbol(sym) => write!(f, "Symbol(@{})", sym.raw()),
            Self::Void => write!(f, "<void>"),
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        Self::string(s)
    }
}

impl From<u32> for PropertyKey {
    fn from(i: u32) -> Self {
        Self::index(i)
    }
}

/// Property attributes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PropertyAttributes {
    /// Property is writable
    pub writable: bool,
    /// Property is enumerable
    pub enumerable: bool,
    /// Property is configurable
    pub configurable: bool,
}

impl PropertyAttributes {
    /// Default data property attributes
    pub const fn data() -> Self {
        Self {
            writable: true,
            enumerable: true,
            configurable: true,
        }
    }

    /// Non-writable, non-enumerable, non-configurable
    pub const fn frozen() -> Self {
        Self {
            writable: false,
            enumerable: false,
            configurable: false,
        }
    }
}

impl Default for PropertyAttributes {
    fn default() -> Self {
        Self::data()
    }
}

/// Property descriptor as passed to [[DefineOwnProperty]].
///
/// Every field is optional: an absent field means "not specified", which
/// is different from an explicit `false`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyDescriptor {
    /// `value`
    pub value: Option<Value>,
    /// `writable`
    pub writable: Option<bool>,
    /// `get`
    pub get: Option<Value>,
    /// `set`
    pub set: Option<Value>,
    /// `enumerable`
    pub enumerable: Option<bool>,
    /// `configurable`
    pub configurable: Option<bool>,
}

impl PropertyDescriptor {
    /// Data descriptor with default (all `true`) attributes
    pub fn data(value: Value) -> Self {
        Self::data_with_attrs(value, PropertyAttributes::data())
    }

    /// Data descriptor with explicit attributes
    pub fn data_with_attrs(value: Value, attributes: PropertyAttributes) -> Self {
        Self {
            value: Some(value),
            writable: Some(attributes.writable),
            get: None,
            set: None,
            enumerable: Some(attributes.enumerable),
            configurable: Some(attributes.configurable),
        }
    }

    /// Descriptor that only carries a value, like `{ value: v }`
    pub fn value_only(value: Value) -> Self {
        Self {
            value: Some(value),
            ..Self::default()
        }
    }

    /// Accessor descriptor
    pub fn accessor(get: Option<Value>, set: Option<Value>) -> Self {
        Self {
            get,
            set,
            ..Self::default()
        }
    }

    /// Has `get` or `set`
    pub fn is_accessor_descriptor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }

    /// Has `value` or `writable`
    pub fn is_data_descriptor(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }

    /// Neither data nor accessor
    pub fn is_generic_descriptor(&self) -> bool {
        !self.is_accessor_descriptor() && !self.is_data_descriptor()
    }

    /// Whether any attribute is explicitly `false`
    pub fn restricts_attributes(&self) -> bool {
        self.writable == Some(false)
            || self.enumerable == Some(false)
            || self.configurable == Some(false)
    }
}

/// Why an object operation was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpFailure {
    /// Assignment to a non-writable property
    ReadOnly,
    /// New property on a non-extensible object
    NotExtensible,
    /// Property could not be deleted
    CantDelete,
    /// Property could not be defined
    CantDefine,
    /// Property could not be set
    CantSet,
    /// Object refused to become non-extensible
    CantPreventExtensions,
}

impl OpFailure {
    /// Message used when the failure is raised as a TypeError
    pub fn message(self) -> &'static str {
        match self {
            Self::ReadOnly => "property is read-only",
            Self::NotExtensible => "object is not extensible",
            Self::CantDelete => "property could not be deleted",
            Self::CantDefine => "property could not be defined",
            Self::CantSet => "property could not be set",
            Self::CantPreventExtensions => "object could not be made non-extensible",
        }
    }
}

/// Outcome of a mutating object operation.
///
/// A failure here is not an exception: the dispatcher reports `false` in
/// sloppy mode and raises a TypeError in strict mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub enum ObjectOpResult {
    /// The operation succeeded
    Succeeded,
    /// The operation was refused
    Failed(OpFailure),
}

impl ObjectOpResult {
    /// Success
    pub const fn succeed() -> Self {
        Self::Succeeded
    }

    /// Failure with a reason
    pub const fn fail(reason: OpFailure) -> Self {
        Self::Failed(reason)
    }

    /// Whether the operation succeeded
    pub fn ok(self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// A stored data property
#[derive(Clone, Debug, PartialEq)]
pub struct Property {
    /// The value
    pub value: Value,
    /// Attributes
    pub attributes: PropertyAttributes,
}

/// An ordinary host object.
///
/// Stores data properties only; accessor definitions are refused.
#[derive(Debug)]
pub struct JsObject {
    properties: IndexMap<PropertyKey, Property>,
    prototype: Option<GcRef>,
    extensible: bool,
}

impl JsObject {
    /// Create a new empty object
    pub fn new(prototype: Option<GcRef>) -> Self {
        Self {
            properties: IndexMap::new(),
            prototype,
            extensible: true,
        }
    }

    /// Get prototype
    pub fn prototype(&self) -> Option<GcRef> {
        self.prototype
    }

    /// Own property lookup
    pub fn get_own(&self, key: &PropertyKey) -> Option<&Property> {
        self.properties.get(key)
    }

    /// Check if object has own property
    pub fn has_own(&self, key: &PropertyKey) -> bool {
        self.properties.contains_key(key)
    }

    /// [[Set]] on an own data property
    pub fn set(&mut self, key: PropertyKey, value: Value) -> ObjectOpResult {
        if let Some(prop) = self.properties.get_mut(&key) {
            if !prop.attributes.writable {
                return ObjectOpResult::fail(OpFailure::ReadOnly);
            }
            prop.value = value;
            return ObjectOpResult::succeed();
        }

        if !self.extensible {
            return ObjectOpResult::fail(OpFailure::NotExtensible);
        }
        self.properties.insert(
            key,
            Property {
                value,
                attributes: PropertyAttributes::data(),
            },
        );
        ObjectOpResult::succeed()
    }

    /// [[DefineOwnProperty]]
    pub fn define(&mut self, key: PropertyKey, desc: &PropertyDescriptor) -> ObjectOpResult {
        if desc.is_accessor_descriptor() {
            return ObjectOpResult::fail(OpFailure::CantDefine);
        }

        if let Some(prop) = self.properties.get_mut(&key) {
            if !prop.attributes.configurable {
                let same_value = desc.value.as_ref().is_none_or(|v| *v == prop.value);
                let loosens = desc.configurable == Some(true)
                    || (desc.enumerable.is_some_and(|e| e != prop.attributes.enumerable))
                    || (!prop.attributes.writable && desc.writable == Some(true));
                if loosens || (!prop.attributes.writable && !same_value) {
                    return ObjectOpResult::fail(OpFailure::CantDefine);
                }
            }
            if let Some(value) = &desc.value {
                prop.value = value.clone();
            }
            if let Some(writable) = desc.writable {
                prop.attributes.writable = writable;
            }
            if let Some(enumerable) = desc.enumerable {
                prop.attributes.enumerable = enumerable;
            }
            if let Some(configurable) = desc.configurable {
                prop.attributes.configurable = configurable;
            }
            return ObjectOpResult::succeed();
        }

        if !self.extensible {
            return ObjectOpResult::fail(OpFailure::NotExtensible);
        }
        self.properties.insert(
            key,
            Property {
                value: desc.value.clone().unwrap_or(Value::Undefined),
                attributes: PropertyAttributes {
                    writable: desc.writable.unwrap_or(false),
                    enumerable: desc.enumerable.unwrap_or(false),
                    configurable: desc.configurable.unwrap_or(false),
                },
            },
        );
        ObjectOpResult::succeed()
    }

    /// [[Delete]]. Deleting an absent property succeeds.
    pub fn delete(&mut self, key: &PropertyKey) -> ObjectOpResult {
        match self.properties.get(key) {
            Some(prop) if !prop.attributes.configurable => {
                ObjectOpResult::fail(OpFailure::CantDelete)
            }
            Some(_) => {
                self.properties.shift_remove(key);
                ObjectOpResult::succeed()
            }
            None => ObjectOpResult::succeed(),
        }
    }

    /// Own property keys: indices ascending, then strings and symbols in
    /// insertion order
    pub fn own_keys(&self) -> Vec<PropertyKey> {
        let mut indices: Vec<u32> = self
            .properties
            .keys()
            .filter_map(|k| match k {
                PropertyKey::Index(i) => Some(*i),
                _ => None,
            })
            .collect();
        indices.sort_unstable();

        let mut keys: Vec<PropertyKey> = indices.into_iter().map(PropertyKey::Index).collect();
        keys.extend(
            self.properties
                .keys()
                .filter(|k| matches!(k, PropertyKey::String(_)))
                .cloned(),
        );
        keys.extend(self.properties.keys().filter(|k| k.is_symbol()).cloned());
        keys
    }

    /// Enumerable own keys (strings and indices only), in [`Self::own_keys`] order
    pub fn own_enumerable_keys(&self) -> Vec<PropertyKey> {
        self.own_keys()
            .into_iter()
            .filter(|k| !k.is_symbol())
            .filter(|k| {
                self.properties
                    .get(k)
                    .is_some_and(|p| p.attributes.enumerable)
            })
            .collect()
    }

    /// [[PreventExtensions]]
    pub fn prevent_extensions(&mut self) {
        self.extensible = false;
    }

    /// [[IsExtensible]]
    pub fn is_extensible(&self) -> bool {
        self.extensible
    }

    /// Number of own properties
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Has no own properties
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub(crate) fn trace(&self, tracer: &mut dyn FnMut(GcRef)) {
        for prop in self.properties.values() {
            if let Some(obj) = prop.value.as_object() {
                tracer(obj);
            }
        }
        if let Some(proto) = self.prototype {
            tracer(proto);
        }
    }
}
