//! Property identifier translation
//!
//! Host identifiers become foreign keys by way of their host value and
//! ToString, so `obj[0]` and `obj["0"]` address the same foreign `'0'`.
//! Only string foreign keys have a host identifier.

use otter_foreign::ForeignKey;
use otter_host::{Context, PropertyKey, Value};

use crate::coerce::host_to_foreign;
use crate::error::{BridgeError, BridgeResult};

/// Result of translating a host identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslatedKey {
    /// The foreign key addressing the property
    Key(ForeignKey),
    /// Symbol or void: no foreign key can address it
    Unsupported,
}

/// Host identifier to foreign key
pub fn identifier_to_foreign_key(cx: &Context, key: &PropertyKey) -> BridgeResult<TranslatedKey> {
    if key.is_symbol() || key.is_void() {
        return Ok(TranslatedKey::Unsupported);
    }

    let name = cx.to_string(&key.to_value())?;
    let foreign = host_to_foreign(cx, &Value::String(name))?;
    let key = ForeignKey::try_from(foreign).map_err(|e| BridgeError::conversion(e.to_string()))?;
    Ok(TranslatedKey::Key(key))
}

/// Foreign key to host identifier; `None` for non-string keys
pub fn foreign_key_to_identifier(
    cx: &Context,
    key: &ForeignKey,
) -> BridgeResult<Option<PropertyKey>> {
    match key {
        ForeignKey::Str(s) => Ok(Some(cx.to_property_key(&Value::String(s.clone()))?)),
        _ => Ok(None),
    }
}
