//! Abstract conversions: ToString and ToPropertyKey

use std::sync::Arc;

use crate::error::{VmError, VmResult};
use crate::object::PropertyKey;
use crate::value::Value;

/// Number::toString for radix 10
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let magnitude = n.abs();
    if (1e-6..1e21).contains(&magnitude) {
        // Shortest round-trip digits in positional notation
        return format!("{}", n);
    }

    let exp = format!("{:e}", n);
    match exp.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => exp,
    }
}

/// ToString
///
/// Objects stringify as `[object Object]`; there is no user-visible
/// ToPrimitive hook in this host.
pub fn to_string(value: &Value) -> VmResult<Arc<str>> {
    match value {
        Value::Undefined => Ok(Arc::from("undefined")),
        Value::Null => Ok(Arc::from("null")),
        Value::Boolean(true) => Ok(Arc::from("true")),
        Value::Boolean(false) => Ok(Arc::from("false")),
        Value::Number(n) => Ok(Arc::from(number_to_string(*n))),
        Value::String(s) => Ok(s.clone()),
        Value::Symbol(_) => Err(VmError::type_error(
            "Cannot convert a Symbol value to a string",
        )),
        Value::Object(_) => Ok(Arc::from("[object Object]")),
    }
}

/// ToPropertyKey
pub fn to_property_key(value: &Value) -> VmResult<PropertyKey> {
    match value {
        Value::Symbol(sym) => Ok(PropertyKey::Symbol(*sym)),
        Value::Number(n) if n.fract() == 0.0 && *n >= 0.0 && *n < f64::from(u32::MAX) => {
            Ok(PropertyKey::Index(*n as u32))
        }
        Value::String(s) => Ok(PropertyKey::string(s)),
        other => Ok(PropertyKey::string(&to_string(other)?)),
    }
}
