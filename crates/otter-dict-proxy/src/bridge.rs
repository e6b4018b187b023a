//! Embedder entry points

use std::sync::Arc;

use otter_foreign::{DictRef, ForeignValue};
use otter_host::{Context, GcRef, ProxyHandler, Value, VmResult};

use crate::coerce::{foreign_slot, foreign_to_host, host_to_foreign};
use crate::config::BridgeConfig;
use crate::handler::DictProxyHandler;

/// Owns the shared trap set and converts values for an embedder.
///
/// ```ignore
/// let bridge = DictBridge::new(BridgeConfig::default());
/// let proxy = bridge.wrap(&mut cx, dict.clone());
/// cx.set(proxy, &PropertyKey::string("a"), Value::int32(1))?;
/// ```
#[derive(Clone)]
pub struct DictBridge {
    handler: Arc<dyn ProxyHandler>,
}

impl DictBridge {
    /// Create a bridge with its own handler
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            handler: Arc::new(DictProxyHandler::new(config)),
        }
    }

    /// The handler serving this bridge's proxies
    pub fn handler(&self) -> &Arc<dyn ProxyHandler> {
        &self.handler
    }

    /// Expose `dict` as a new proxy. The proxy owns the given reference.
    pub fn wrap(&self, cx: &mut Context, dict: DictRef) -> GcRef {
        crate::slot::wrap_dict(cx, self.handler.clone(), dict)
    }

    /// Foreign value to host value
    pub fn to_host(&self, cx: &mut Context, value: &ForeignValue) -> VmResult<Value> {
        Ok(foreign_to_host(cx, &self.handler, value)?)
    }

    /// Host value to foreign value
    pub fn to_foreign(&self, cx: &Context, value: &Value) -> VmResult<ForeignValue> {
        let _gil = otter_foreign::lock();
        Ok(host_to_foreign(cx, value)?)
    }

    /// A new reference to the mapping behind `proxy`, if it wraps one
    pub fn unwrap(&self, cx: &Context, proxy: GcRef) -> Option<DictRef> {
        foreign_slot(cx, proxy)?.with_dict(DictRef::clone).ok()
    }
}

impl Default for DictBridge {
    fn default() -> Self {
        Self::new(BridgeConfig::default())
    }
}

impl std::fmt::Debug for DictBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DictBridge {{ family: {} }}", self.handler.family())
    }
}
