//! Value coercion between host and foreign runtimes
//!
//! | host | foreign |
//! |---|---|
//! | `undefined` | `None` |
//! | `null` | `Null` |
//! | boolean | `Bool` |
//! | number | `Float` (and `Int` within the safe-integer range on the way in) |
//! | string | `Str` |
//! | mapping proxy | the wrapped `Dict` itself |
//! | ordinary object | fresh `Dict` of its enumerable own properties |

use std::sync::Arc;

use otter_foreign::{DictRef, ForeignValue};
use otter_host::{Context, GcRef, ProxyHandler, Value, VmError};
use rustc_hash::FxHashMap;

use crate::error::{BridgeError, BridgeResult};
use crate::key::{TranslatedKey, identifier_to_foreign_key};
use crate::slot::{ForeignSlot, wrap_dict};

/// Largest integer a host number represents exactly (2^53 - 1)
pub const MAX_SAFE_INTEGER: i64 = (1 << 53) - 1;

/// Host value to foreign value.
///
/// Ordinary objects are copied into new mappings. An object reached twice
/// becomes one shared mapping. A cycle is a conversion error: mappings are
/// only reference counted, so a cyclic copy would never be freed.
pub fn host_to_foreign(cx: &Context, value: &Value) -> BridgeResult<ForeignValue> {
    let mut converted = FxHashMap::default();
    convert_value(cx, value, &mut converted)
}

fn convert_value(
    cx: &Context,
    value: &Value,
    converted: &mut FxHashMap<GcRef, Option<DictRef>>,
) -> BridgeResult<ForeignValue> {
    match value {
        Value::Undefined => Ok(ForeignValue::None),
        Value::Null => Ok(ForeignValue::Null),
        Value::Boolean(b) => Ok(ForeignValue::Bool(*b)),
        Value::Number(n) => Ok(ForeignValue::Float(*n)),
        Value::String(s) => Ok(ForeignValue::Str(s.clone())),
        Value::Symbol(_) => Err(BridgeError::conversion(
            "symbols have no foreign representation",
        )),
        Value::Object(obj) => convert_object(cx, *obj, converted),
    }
}

fn convert_object(
    cx: &Context,
    obj: GcRef,
    converted: &mut FxHashMap<GcRef, Option<DictRef>>,
) -> BridgeResult<ForeignValue> {
    // `None` marks an object whose conversion is still in progress
    match converted.get(&obj) {
        Some(Some(dict)) => return Ok(ForeignValue::Dict(dict.clone())),
        Some(None) => {
            return Err(BridgeError::conversion(format!(
                "{} refers back to itself and cannot be copied into a foreign mapping",
                obj
            )));
        }
        None => {}
    }

    if cx.is_proxy(obj) {
        return match foreign_slot(cx, obj) {
            Some(slot) => Ok(ForeignValue::Dict(slot.with_dict(DictRef::clone)?)),
            None => {
                let family = cx.proxy_handler(obj).map_or("unknown", |h| h.family());
                Err(BridgeError::conversion(format!(
                    "{} proxies have no foreign representation",
                    family
                )))
            }
        };
    }

    let object = cx
        .ordinary(obj)
        .ok_or_else(|| VmError::internal(format!("dangling object reference {}", obj)))?;
    let dict = DictRef::new();
    converted.insert(obj, None);

    for key in object.own_enumerable_keys() {
        let Some(prop) = object.get_own(&key) else {
            continue;
        };
        let TranslatedKey::Key(foreign_key) = identifier_to_foreign_key(cx, &key)? else {
            continue;
        };
        let foreign_value = convert_value(cx, &prop.value, converted)?;
        dict.set_item(foreign_key.clone(), foreign_value)
            .map_err(|source| BridgeError::store("set", &foreign_key, source))?;
    }

    converted.insert(obj, Some(dict.clone()));
    Ok(ForeignValue::Dict(dict))
}

/// Foreign value to host value.
///
/// Mappings are not copied: each one is exposed through a new proxy served
/// by `handler`.
pub fn foreign_to_host(
    cx: &mut Context,
    handler: &Arc<dyn ProxyHandler>,
    value: &ForeignValue,
) -> BridgeResult<Value> {
    match value {
        ForeignValue::None => Ok(Value::Undefined),
        ForeignValue::Null => Ok(Value::Null),
        ForeignValue::Bool(b) => Ok(Value::Boolean(*b)),
        ForeignValue::Int(i) => int_to_host(*i),
        ForeignValue::Float(x) => Ok(Value::Number(*x)),
        ForeignValue::Str(s) => Ok(Value::String(s.clone())),
        ForeignValue::Dict(dict) => Ok(Value::Object(wrap_dict(
            cx,
            handler.clone(),
            dict.clone(),
        ))),
    }
}

fn int_to_host(i: i64) -> BridgeResult<Value> {
    if i.unsigned_abs() <= MAX_SAFE_INTEGER as u64 {
        Ok(Value::Number(i as f64))
    } else {
        Err(BridgeError::conversion(format!(
            "integer {} is outside the host's safe integer range",
            i
        )))
    }
}

/// The foreign slot of a mapping proxy
pub(crate) fn foreign_slot(cx: &Context, obj: GcRef) -> Option<Arc<ForeignSlot>> {
    cx.proxy_private(obj)?.downcast::<ForeignSlot>().ok()
}
