//! Trap set for foreign-mapping proxies
//!
//! Every trap reads or writes the mapping live under the interpreter lock.
//! Nothing is cached between traps, so changes made by foreign code are
//! visible on the next access.

use std::sync::Arc;

use otter_foreign::{DictRef, ForeignKey, ForeignValue};
use otter_host::{
    Context, GcRef, ObjectOpResult, OpFailure, PropertyDescriptor, PropertyKey, PrototypeLookup,
    ProxyHandler, ProxyObject, Value, VmError, VmResult,
};
use tracing::{debug, trace, warn};

use crate::coerce::{foreign_slot, foreign_to_host, host_to_foreign};
use crate::config::{BridgeConfig, DescriptorPolicy, SymbolKeyPolicy};
use crate::error::{BridgeError, BridgeResult};
use crate::key::{TranslatedKey, foreign_key_to_identifier, identifier_to_foreign_key};
use crate::slot::ForeignSlot;

/// Family name reported by [`DictProxyHandler`]
pub const FAMILY: &str = "otter.foreign-dict";

/// Serves every proxy that wraps a foreign mapping
#[derive(Debug, Default)]
pub struct DictProxyHandler {
    config: BridgeConfig,
}

impl DictProxyHandler {
    /// Create a handler
    pub fn new(config: BridgeConfig) -> Self {
        Self { config }
    }

    /// Configuration
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    fn slot(cx: &Context, proxy: GcRef) -> BridgeResult<Arc<ForeignSlot>> {
        foreign_slot(cx, proxy).ok_or_else(|| {
            BridgeError::Host(VmError::internal(format!(
                "{} does not wrap a foreign mapping",
                proxy
            )))
        })
    }

    /// Translate `key`; `None` means the symbol policy treats it as absent
    fn translate(&self, cx: &Context, key: &PropertyKey) -> BridgeResult<Option<ForeignKey>> {
        match identifier_to_foreign_key(cx, key)? {
            TranslatedKey::Key(key) => Ok(Some(key)),
            TranslatedKey::Unsupported => match self.config.symbol_keys {
                SymbolKeyPolicy::Reject => Err(BridgeError::UnsupportedIdentifier),
                SymbolKeyPolicy::TreatAsAbsent => Ok(None),
            },
        }
    }

    fn try_own_keys(&self, cx: &Context, proxy: GcRef) -> BridgeResult<Vec<PropertyKey>> {
        let _gil = otter_foreign::lock();
        let keys = Self::slot(cx, proxy)?.with_dict(DictRef::keys)?;

        let mut identifiers = Vec::with_capacity(keys.len());
        for key in &keys {
            match foreign_key_to_identifier(cx, key)? {
                Some(identifier) => identifiers.push(identifier),
                None => trace!(
                    target: "otter::dict_proxy",
                    key = %key,
                    "skipping non-string key"
                ),
            }
        }
        Ok(identifiers)
    }

    fn try_has(&self, cx: &Context, proxy: GcRef, key: &PropertyKey) -> BridgeResult<bool> {
        let _gil = otter_foreign::lock();
        let Some(key) = self.translate(cx, key)? else {
            return Ok(false);
        };
        Self::slot(cx, proxy)?.with_dict(|dict| dict.contains_key(&key))
    }

    fn try_get(&self, cx: &mut Context, proxy: GcRef, key: &PropertyKey) -> BridgeResult<Value> {
        let _gil = otter_foreign::lock();
        let Some(key) = self.translate(cx, key)? else {
            return Ok(Value::Undefined);
        };
        let stored = Self::slot(cx, proxy)?.with_dict(|dict| dict.get_item(&key))?;
        match stored {
            None => Ok(Value::Undefined),
            Some(value) => {
                let handler = cx.proxy_handler(proxy).ok_or_else(|| {
                    VmError::internal(format!("{} is not a proxy", proxy))
                })?;
                foreign_to_host(cx, &handler, &value)
            }
        }
    }

    fn try_set(
        &self,
        cx: &Context,
        proxy: GcRef,
        key: &PropertyKey,
        value: &Value,
    ) -> BridgeResult<ObjectOpResult> {
        let _gil = otter_foreign::lock();
        let Some(key) = self.translate(cx, key)? else {
            return Ok(ObjectOpResult::fail(OpFailure::CantSet));
        };
        let value = host_to_foreign(cx, value)?;
        let slot = Self::slot(cx, proxy)?;
        Self::store(&slot, "set", key, value)
    }

    /// Insert or overwrite. New keys are refused once the proxy is not
    /// extensible.
    fn store(
        slot: &ForeignSlot,
        op: &'static str,
        key: ForeignKey,
        value: ForeignValue,
    ) -> BridgeResult<ObjectOpResult> {
        slot.with_dict(|dict| -> BridgeResult<ObjectOpResult> {
            if !slot.is_extensible() && !dict.contains_key(&key) {
                return Ok(ObjectOpResult::fail(OpFailure::NotExtensible));
            }
            dict.set_item(key.clone(), value)
                .map_err(|source| BridgeError::store(op, &key, source))?;
            Ok(ObjectOpResult::succeed())
        })?
    }

    fn try_delete(
        &self,
        cx: &Context,
        proxy: GcRef,
        key: &PropertyKey,
    ) -> BridgeResult<ObjectOpResult> {
        let _gil = otter_foreign::lock();
        let Some(key) = self.translate(cx, key)? else {
            return Ok(ObjectOpResult::fail(OpFailure::CantDelete));
        };
        Self::slot(cx, proxy)?
            .with_dict(|dict| dict.del_item(&key))?
            .map_err(|source| BridgeError::store("delete", &key, source))?;
        Ok(ObjectOpResult::succeed())
    }

    fn try_define(
        &self,
        cx: &Context,
        proxy: GcRef,
        key: &PropertyKey,
        desc: &PropertyDescriptor,
    ) -> BridgeResult<ObjectOpResult> {
        let _gil = otter_foreign::lock();
        let Some(foreign_key) = self.translate(cx, key)? else {
            return Ok(ObjectOpResult::fail(OpFailure::CantDefine));
        };
        if desc.is_accessor_descriptor() {
            return Err(BridgeError::conversion(format!(
                "accessor property {} cannot be stored in a foreign mapping",
                key
            )));
        }
        if desc.restricts_attributes() && self.config.descriptors == DescriptorPolicy::Strict {
            return Err(BridgeError::conversion(format!(
                "attributes of property {} cannot be represented in a foreign mapping",
                key
            )));
        }

        let slot = Self::slot(cx, proxy)?;
        match &desc.value {
            Some(value) => {
                let value = host_to_foreign(cx, value)?;
                Self::store(&slot, "define", foreign_key, value)
            }
            None if slot.with_dict(|dict| dict.contains_key(&foreign_key))? => {
                Ok(ObjectOpResult::succeed())
            }
            None => Self::store(&slot, "define", foreign_key, ForeignValue::None),
        }
    }

    fn try_prevent_extensions(&self, cx: &Context, proxy: GcRef) -> BridgeResult<ObjectOpResult> {
        let slot = Self::slot(cx, proxy)?;
        slot.check_live()?;
        slot.prevent_extensions();
        Ok(ObjectOpResult::succeed())
    }

    fn try_is_extensible(&self, cx: &Context, proxy: GcRef) -> BridgeResult<bool> {
        let slot = Self::slot(cx, proxy)?;
        slot.check_live()?;
        Ok(slot.is_extensible())
    }
}

impl ProxyHandler for DictProxyHandler {
    fn family(&self) -> &'static str {
        FAMILY
    }

    fn own_property_keys(&self, cx: &mut Context, proxy: GcRef) -> VmResult<Vec<PropertyKey>> {
        trace!(target: "otter::dict_proxy", trap = "ownKeys", proxy = %proxy);
        Ok(self.try_own_keys(cx, proxy)?)
    }

    fn enumerate(&self, cx: &mut Context, proxy: GcRef) -> VmResult<Vec<PropertyKey>> {
        trace!(target: "otter::dict_proxy", trap = "enumerate", proxy = %proxy);
        Ok(self.try_own_keys(cx, proxy)?)
    }

    fn get_own_enumerable_property_keys(
        &self,
        cx: &mut Context,
        proxy: GcRef,
    ) -> VmResult<Vec<PropertyKey>> {
        trace!(target: "otter::dict_proxy", trap = "ownEnumerableKeys", proxy = %proxy);
        Ok(self.try_own_keys(cx, proxy)?)
    }

    fn has(&self, cx: &mut Context, proxy: GcRef, key: &PropertyKey) -> VmResult<bool> {
        trace!(target: "otter::dict_proxy", trap = "has", proxy = %proxy, key = %key);
        Ok(self.try_has(cx, proxy, key)?)
    }

    fn has_own(&self, cx: &mut Context, proxy: GcRef, key: &PropertyKey) -> VmResult<bool> {
        trace!(target: "otter::dict_proxy", trap = "hasOwn", proxy = %proxy, key = %key);
        Ok(self.try_has(cx, proxy, key)?)
    }

    fn get(
        &self,
        cx: &mut Context,
        proxy: GcRef,
        _receiver: &Value,
        key: &PropertyKey,
    ) -> VmResult<Value> {
        trace!(target: "otter::dict_proxy", trap = "get", proxy = %proxy, key = %key);
        Ok(self.try_get(cx, proxy, key)?)
    }

    fn set(
        &self,
        cx: &mut Context,
        proxy: GcRef,
        key: &PropertyKey,
        value: &Value,
        _receiver: &Value,
    ) -> VmResult<ObjectOpResult> {
        trace!(target: "otter::dict_proxy", trap = "set", proxy = %proxy, key = %key);
        Ok(self.try_set(cx, proxy, key, value)?)
    }

    fn delete(
        &self,
        cx: &mut Context,
        proxy: GcRef,
        key: &PropertyKey,
    ) -> VmResult<ObjectOpResult> {
        trace!(target: "otter::dict_proxy", trap = "delete", proxy = %proxy, key = %key);
        Ok(self.try_delete(cx, proxy, key)?)
    }

    fn define_property(
        &self,
        cx: &mut Context,
        proxy: GcRef,
        key: &PropertyKey,
        desc: &PropertyDescriptor,
    ) -> VmResult<ObjectOpResult> {
        trace!(target: "otter::dict_proxy", trap = "defineProperty", proxy = %proxy, key = %key);
        Ok(self.try_define(cx, proxy, key, desc)?)
    }

    fn prevent_extensions(&self, cx: &mut Context, proxy: GcRef) -> VmResult<ObjectOpResult> {
        trace!(target: "otter::dict_proxy", trap = "preventExtensions", proxy = %proxy);
        Ok(self.try_prevent_extensions(cx, proxy)?)
    }

    fn is_extensible(&self, cx: &mut Context, proxy: GcRef) -> VmResult<bool> {
        trace!(target: "otter::dict_proxy", trap = "isExtensible", proxy = %proxy);
        Ok(self.try_is_extensible(cx, proxy)?)
    }

    fn get_prototype_if_ordinary(
        &self,
        cx: &mut Context,
        proxy: GcRef,
    ) -> VmResult<PrototypeLookup> {
        trace!(target: "otter::dict_proxy", trap = "getPrototypeIfOrdinary", proxy = %proxy);
        Ok(PrototypeLookup::Ordinary(cx.proxy_static_prototype(proxy)?))
    }

    fn finalize(&self, proxy: &ProxyObject) {
        let _gil = otter_foreign::lock();
        let Ok(slot) = proxy.private().clone().downcast::<ForeignSlot>() else {
            warn!(target: "otter::dict_proxy", "finalizing a proxy without a foreign slot");
            return;
        };

        match slot.release() {
            Some(dict) => {
                let refcount = dict.refcount();
                drop(dict);
                debug!(
                    target: "otter::dict_proxy",
                    refcount_before = refcount,
                    refcount_after = refcount - 1,
                    "released foreign mapping"
                );
            }
            None => warn!(target: "otter::dict_proxy", "mapping proxy finalized twice"),
        }
    }
}
