//! Host execution context and object-protocol dispatcher
//!
//! Every fundamental object operation enters here. Ordinary objects are
//! served from their own storage; proxies are routed to their handler.

use std::sync::Arc;

use crate::config::HostConfig;
use crate::convert;
use crate::error::{VmError, VmResult};
use crate::gc::{GcRef, Heap, HeapObject, HeapStats};
use crate::object::{JsObject, ObjectOpResult, OpFailure, PropertyDescriptor, PropertyKey};
use crate::proxy::{PrototypeLookup, ProxyHandler, ProxyObject, ProxyPrivate};
use crate::value::{SymbolId, Value};

/// Host runtime instance: heap, realm intrinsics, and dispatcher
pub struct Context {
    heap: Heap,
    config: HostConfig,
    object_prototype: GcRef,
    global: GcRef,
    next_symbol: u64,
}

impl Context {
    /// Create a context with its own heap
    pub fn new(config: HostConfig) -> Self {
        let mut heap = Heap::with_threshold(config.gc_threshold);
        let object_prototype = heap.allocate(HeapObject::Ordinary(JsObject::new(None)));
        let global = heap.allocate(HeapObject::Ordinary(JsObject::new(Some(object_prototype))));
        Self {
            heap,
            config,
            object_prototype,
            global,
            next_symbol: 1,
        }
    }

    /// Configuration
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// The realm's `Object.prototype`
    pub fn object_prototype(&self) -> GcRef {
        self.object_prototype
    }

    /// The global object; always a root
    pub fn global(&self) -> GcRef {
        self.global
    }

    /// Allocate a plain object inheriting from `Object.prototype`
    pub fn new_object(&mut self) -> GcRef {
        self.new_object_with_proto(Some(self.object_prototype))
    }

    /// Allocate a plain object with an explicit prototype
    pub fn new_object_with_proto(&mut self, prototype: Option<GcRef>) -> GcRef {
        self.heap
            .allocate(HeapObject::Ordinary(JsObject::new(prototype)))
    }

    /// Allocate a proxy. The private slot is initialized before the proxy is
    /// reachable, so no trap ever observes an empty slot.
    pub fn new_proxy(
        &mut self,
        handler: Arc<dyn ProxyHandler>,
        private: ProxyPrivate,
        prototype: Option<GcRef>,
    ) -> GcRef {
        self.heap
            .allocate(HeapObject::Proxy(ProxyObject::new(handler, private, prototype)))
    }

    /// Create a fresh symbol
    pub fn new_symbol(&mut self) -> Value {
        let id = SymbolId(self.next_symbol);
        self.next_symbol += 1;
        Value::Symbol(id)
    }

    fn cell(&self, obj: GcRef) -> VmResult<&HeapObject> {
        self.heap
            .get(obj)
            .ok_or_else(|| VmError::internal(format!("dangling object reference {}", obj)))
    }

    fn proxy_of(&self, obj: GcRef) -> VmResult<Option<Arc<dyn ProxyHandler>>> {
        Ok(self.cell(obj)?.as_proxy().map(|p| p.handler().clone()))
    }

    fn ordinary_ref(&self, obj: GcRef) -> VmResult<&JsObject> {
        self.cell(obj)?
            .as_ordinary()
            .ok_or_else(|| VmError::internal("expected an ordinary object"))
    }

    fn ordinary_mut(&mut self, obj: GcRef) -> VmResult<&mut JsObject> {
        match self.heap.get_mut(obj) {
            Some(HeapObject::Ordinary(o)) => Ok(o),
            Some(HeapObject::Proxy(_)) => Err(VmError::internal("expected an ordinary object")),
            None => Err(VmError::internal(format!(
                "dangling object reference {}",
                obj
            ))),
        }
    }

    /// Ordinary object storage, if `obj` is a live ordinary object
    pub fn ordinary(&self, obj: GcRef) -> Option<&JsObject> {
        self.heap.get(obj)?.as_ordinary()
    }

    /// Whether `obj` is a live proxy
    pub fn is_proxy(&self, obj: GcRef) -> bool {
        self.heap.get(obj).is_some_and(|c| c.as_proxy().is_some())
    }

    /// The proxy's handler
    pub fn proxy_handler(&self, obj: GcRef) -> Option<Arc<dyn ProxyHandler>> {
        self.heap
            .get(obj)?
            .as_proxy()
            .map(|p| p.handler().clone())
    }

    /// The proxy's private slot
    pub fn proxy_private(&self, obj: GcRef) -> Option<ProxyPrivate> {
        self.heap
            .get(obj)?
            .as_proxy()
            .map(|p| p.private().clone())
    }

    /// The prototype a proxy was created with
    pub fn proxy_static_prototype(&self, obj: GcRef) -> VmResult<Option<GcRef>> {
        self.cell(obj)?
            .as_proxy()
            .map(ProxyObject::static_prototype)
            .ok_or_else(|| VmError::internal("expected a proxy object"))
    }

    /// Whether the handle still names a live object
    pub fn is_live(&self, obj: GcRef) -> bool {
        self.heap.is_live(obj)
    }

    /// Turn a refused operation into `false` (sloppy) or a TypeError (strict)
    pub fn check_result(&self, result: ObjectOpResult) -> VmResult<bool> {
        match result {
            ObjectOpResult::Succeeded => Ok(true),
            ObjectOpResult::Failed(reason) if self.config.strict => {
                Err(VmError::type_error(reason.message()))
            }
            ObjectOpResult::Failed(_) => Ok(false),
        }
    }

    /// ToString
    pub fn to_string(&self, value: &Value) -> VmResult<Arc<str>> {
        convert::to_string(value)
    }

    /// ToPropertyKey
    pub fn to_property_key(&self, value: &Value) -> VmResult<PropertyKey> {
        convert::to_property_key(value)
    }

    /// [[Get]] with the object itself as receiver
    pub fn get(&mut self, obj: GcRef, key: &PropertyKey) -> VmResult<Value> {
        self.get_with_receiver(obj, key, &Value::Object(obj))
    }

    /// `obj[key]` with a computed key
    pub fn get_computed(&mut self, obj: GcRef, key: &Value) -> VmResult<Value> {
        let key = self.to_property_key(key)?;
        self.get(obj, &key)
    }

    /// [[Get]] walking the prototype chain
    pub fn get_with_receiver(
        &mut self,
        obj: GcRef,
        key: &PropertyKey,
        receiver: &Value,
    ) -> VmResult<Value> {
        let mut current = obj;
        loop {
            if let Some(handler) = self.proxy_of(current)? {
                return handler.get(self, current, receiver, key);
            }
            let o = self.ordinary_ref(current)?;
            if let Some(prop) = o.get_own(key) {
                return Ok(prop.value.clone());
            }
            match o.prototype() {
                Some(proto) => current = proto,
                None => return Ok(Value::Undefined),
            }
        }
    }

    /// [[Set]].
    ///
    /// An ordinary object without `key` as an own property defers the
    /// assignment to the first proxy on its prototype chain, with the object
    /// as receiver. An inherited read-only property refuses the assignment.
    pub fn set(&mut self, obj: GcRef, key: &PropertyKey, value: Value) -> VmResult<bool> {
        let result = match self.find_setter(obj, key)? {
            Setter::Proxy(holder, handler) => {
                handler.set(self, holder, key, &value, &Value::Object(obj))?
            }
            Setter::ReadOnly => ObjectOpResult::fail(OpFailure::ReadOnly),
            Setter::Own if key.is_void() => ObjectOpResult::fail(OpFailure::CantSet),
            Setter::Own => self.ordinary_mut(obj)?.set(key.clone(), value),
        };
        self.check_result(result)
    }

    fn find_setter(&self, obj: GcRef, key: &PropertyKey) -> VmResult<Setter> {
        let mut current = obj;
        loop {
            if let Some(handler) = self.proxy_of(current)? {
                return Ok(Setter::Proxy(current, handler));
            }
            let o = self.ordinary_ref(current)?;
            if let Some(prop) = o.get_own(key) {
                if current != obj && !prop.attributes.writable {
                    return Ok(Setter::ReadOnly);
                }
                return Ok(Setter::Own);
            }
            match o.prototype() {
                Some(proto) => current = proto,
                None => return Ok(Setter::Own),
            }
        }
    }

    /// `obj[key] = value` with a computed key
    pub fn set_computed(&mut self, obj: GcRef, key: &Value, value: Value) -> VmResult<bool> {
        let key = self.to_property_key(key)?;
        self.set(obj, &key, value)
    }

    /// [[Delete]]
    pub fn delete(&mut self, obj: GcRef, key: &PropertyKey) -> VmResult<bool> {
        let result = if let Some(handler) = self.proxy_of(obj)? {
            handler.delete(self, obj, key)?
        } else {
            self.ordinary_mut(obj)?.delete(key)
        };
        self.check_result(result)
    }

    /// [[HasProperty]] (`key in obj`)
    pub fn has(&mut self, obj: GcRef, key: &PropertyKey) -> VmResult<bool> {
        let mut current = obj;
        loop {
            if let Some(handler) = self.proxy_of(current)? {
                return handler.has(self, current, key);
            }
            let o = self.ordinary_ref(current)?;
            if o.has_own(key) {
                return Ok(true);
            }
            match o.prototype() {
                Some(proto) => current = proto,
                None => return Ok(false),
            }
        }
    }

    /// HasOwnProperty
    pub fn has_own(&mut self, obj: GcRef, key: &PropertyKey) -> VmResult<bool> {
        if let Some(handler) = self.proxy_of(obj)? {
            return handler.has_own(self, obj, key);
        }
        Ok(self.ordinary_ref(obj)?.has_own(key))
    }

    /// [[OwnPropertyKeys]]
    pub fn own_keys(&mut self, obj: GcRef) -> VmResult<Vec<PropertyKey>> {
        if let Some(handler) = self.proxy_of(obj)? {
            return handler.own_property_keys(self, obj);
        }
        Ok(self.ordinary_ref(obj)?.own_keys())
    }

    /// `Object.keys`
    pub fn keys(&mut self, obj: GcRef) -> VmResult<Vec<PropertyKey>> {
        if let Some(handler) = self.proxy_of(obj)? {
            return handler.get_own_enumerable_property_keys(self, obj);
        }
        Ok(self.ordinary_ref(obj)?.own_enumerable_keys())
    }

    /// Keys visited by `for-in`.
    ///
    /// For ordinary objects this walks the prototype chain, skipping shadowed
    /// keys. A proxy's `enumerate` answer is final.
    pub fn enumerate(&mut self, obj: GcRef) -> VmResult<Vec<PropertyKey>> {
        let mut keys: Vec<PropertyKey> = Vec::new();
        let mut current = Some(obj);
        while let Some(cur) = current {
            let (level, next) = if let Some(handler) = self.proxy_of(cur)? {
                (handler.enumerate(self, cur)?, None)
            } else {
                let o = self.ordinary_ref(cur)?;
                (o.own_enumerable_keys(), o.prototype())
            };
            for key in level {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
            current = next;
        }
        Ok(keys)
    }

    /// [[DefineOwnProperty]]
    pub fn define_property(
        &mut self,
        obj: GcRef,
        key: &PropertyKey,
        desc: &PropertyDescriptor,
    ) -> VmResult<bool> {
        let result = if let Some(handler) = self.proxy_of(obj)? {
            handler.define_property(self, obj, key, desc)?
        } else if key.is_void() {
            ObjectOpResult::fail(OpFailure::CantDefine)
        } else {
            self.ordinary_mut(obj)?.define(key.clone(), desc)
        };
        self.check_result(result)
    }

    /// [[PreventExtensions]]
    pub fn prevent_extensions(&mut self, obj: GcRef) -> VmResult<bool> {
        let result = if let Some(handler) = self.proxy_of(obj)? {
            handler.prevent_extensions(self, obj)?
        } else {
            self.ordinary_mut(obj)?.prevent_extensions();
            ObjectOpResult::succeed()
        };
        self.check_result(result)
    }

    /// [[IsExtensible]]
    pub fn is_extensible(&mut self, obj: GcRef) -> VmResult<bool> {
        if let Some(handler) = self.proxy_of(obj)? {
            return handler.is_extensible(self, obj);
        }
        Ok(self.ordinary_ref(obj)?.is_extensible())
    }

    /// [[GetPrototypeOf]]
    pub fn get_prototype_of(&mut self, obj: GcRef) -> VmResult<Option<GcRef>> {
        if let Some(handler) = self.proxy_of(obj)? {
            return match handler.get_prototype_if_ordinary(self, obj)? {
                PrototypeLookup::Ordinary(proto) => Ok(proto),
                PrototypeLookup::Exotic => Err(VmError::internal(format!(
                    "{} proxies have no [[GetPrototypeOf]] trap",
                    handler.family()
                ))),
            };
        }
        Ok(self.ordinary_ref(obj)?.prototype())
    }

    /// Full collection. The global object and `Object.prototype` are always
    /// roots; `roots` adds the caller's live handles.
    pub fn collect_garbage(&mut self, roots: &[GcRef]) -> usize {
        let mut all_roots = Vec::with_capacity(roots.len() + 2);
        all_roots.push(self.global);
        all_roots.push(self.object_prototype);
        all_roots.extend_from_slice(roots);

        let reclaimed = self.heap.collect(&all_roots);
        tracing::debug!(
            target: "otter::host",
            reclaimed,
            live = self.heap.live_count(),
            "collected garbage"
        );
        reclaimed
    }

    /// Collect only if the allocation threshold was reached
    pub fn maybe_collect(&mut self, roots: &[GcRef]) -> usize {
        if self.heap.should_collect() {
            self.collect_garbage(roots)
        } else {
            0
        }
    }

    /// Heap statistics
    pub fn heap_stats(&self) -> HeapStats {
        self.heap.stats()
    }
}

/// Where an assignment lands
enum Setter {
    /// On the receiver itself
    Own,
    /// Refused by an inherited read-only property
    ReadOnly,
    /// Deferred to a proxy on the prototype chain
    Proxy(GcRef, Arc<dyn ProxyHandler>),
}

impl Default for Context {
    fn default() -> Self {
        Self::new(HostConfig::default())
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("heap", &self.heap)
            .field("strict", &self.config.strict)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prototype_chain_get() {
        let mut cx = Context::default();
        let parent = cx.new_object();
        cx.set(parent, &PropertyKey::string("inherited"), Value::int32(1))
            .unwrap();
        let child = cx.new_object_with_proto(Some(parent));

        assert_eq!(
            cx.get(child, &PropertyKey::string("inherited")).unwrap(),
            Value::int32(1)
        );
        assert!(cx.has(child, &PropertyKey::string("inherited")).unwrap());
        assert!(!cx.has_own(child, &PropertyKey::string("inherited")).unwrap());
        assert_eq!(
            cx.get(child, &PropertyKey::string("missing")).unwrap(),
            Value::Undefined
        );
    }

    #[test]
    fn test_computed_keys_normalize() {
        let mut cx = Context::default();
        let obj = cx.new_object();
        cx.set_computed(obj, &Value::int32(0), Value::string("zero"))
            .unwrap();

        assert_eq!(
            cx.get_computed(obj, &Value::string("0")).unwrap(),
            Value::string("zero")
        );
    }

    #[test]
    fn test_strict_and_sloppy_refusal() {
        let mut strict = Context::default();
        let obj = strict.new_object();
        strict.prevent_extensions(obj).unwrap();
        let err = strict
            .set(obj, &PropertyKey::string("x"), Value::Null)
            .unwrap_err();
        assert!(err.is_type_error());

        let mut sloppy = Context::new(HostConfig::sloppy());
        let obj = sloppy.new_object();
        sloppy.prevent_extensions(obj).unwrap();
        assert!(!sloppy.set(obj, &PropertyKey::string("x"), Value::Null).unwrap());
    }

    #[test]
    fn test_enumerate_skips_shadowed() {
        let mut cx = Context::default();
        let parent = cx.new_object();
        cx.set(parent, &PropertyKey::string("a"), Value::int32(1)).unwrap();
        cx.set(parent, &PropertyKey::string("b"), Value::int32(2)).unwrap();
        let child = cx.new_object_with_proto(Some(parent));
        cx.set(child, &PropertyKey::string("b"), Value::int32(3)).unwrap();

        assert_eq!(
            cx.enumerate(child).unwrap(),
            vec![PropertyKey::string("b"), PropertyKey::string("a")]
        );
    }

    #[test]
    fn test_set_respects_inherited_read_only() {
        let mut cx = Context::new(HostConfig::sloppy());
        let parent = cx.new_object();
        let desc = PropertyDescriptor {
            value: Some(Value::int32(1)),
            writable: Some(false),
            ..Default::default()
        };
        cx.define_property(parent, &PropertyKey::string("fixed"), &desc)
            .unwrap();
        let child = cx.new_object_with_proto(Some(parent));

        assert!(!cx.set(child, &PropertyKey::string("fixed"), Value::int32(2)).unwrap());
        assert!(!cx.has_own(child, &PropertyKey::string("fixed")).unwrap());

        // Writable inherited properties are shadowed on the receiver
        cx.set(parent, &PropertyKey::string("open"), Value::int32(1))
            .unwrap();
        assert!(cx.set(child, &PropertyKey::string("open"), Value::int32(2)).unwrap());
        assert_eq!(
            cx.get(parent, &PropertyKey::string("open")).unwrap(),
            Value::int32(1)
        );
        assert_eq!(
            cx.get(child, &PropertyKey::string("open")).unwrap(),
            Value::int32(2)
        );
    }

    #[test]
    fn test_collect_keeps_reachable() {
        let mut cx = Context::default();
        let kept = cx.new_object();
        let nested = cx.new_object();
        cx.set(kept, &PropertyKey::string("child"), Value::Object(nested))
            .unwrap();
        let dropped = cx.new_object();

        let reclaimed = cx.collect_garbage(&[kept]);

        assert_eq!(reclaimed, 1);
        assert!(cx.is_live(kept));
        assert!(cx.is_live(nested));
        assert!(!cx.is_live(dropped));
        assert!(cx.get(dropped, &PropertyKey::string("x")).is_err());
    }
}
