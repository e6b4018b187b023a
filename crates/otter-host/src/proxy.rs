//! Native proxy objects
//!
//! A proxy has no property storage of its own. Every fundamental operation
//! on it is routed by the [`Context`] dispatcher to the proxy's
//! [`ProxyHandler`], which sees the proxy's private slot.
//!
//! ## Usage
//!
//! ```ignore
//! let proxy = cx.new_proxy(handler.clone(), Arc::new(MySlot::new()), Some(cx.object_prototype()));
//! let value = cx.get(proxy, &PropertyKey::string("answer"))?;
//! ```

use std::any::Any;
use std::sync::Arc;

use crate::context::Context;
use crate::error::VmResult;
use crate::gc::GcRef;
use crate::object::{ObjectOpResult, PropertyDescriptor, PropertyKey};
use crate::value::Value;

/// Private data attached to a proxy at creation.
pub type ProxyPrivate = Arc<dyn Any + Send + Sync>;

/// Answer of [`ProxyHandler::get_prototype_if_ordinary`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrototypeLookup {
    /// Prototype lookup is ordinary; this is the prototype
    Ordinary(Option<GcRef>),
    /// The handler resolves the prototype dynamically
    Exotic,
}

/// The trap set of one proxy kind.
///
/// One handler instance serves every proxy of its kind; per-proxy state
/// belongs in the proxy's private slot. Traps run synchronously on the
/// thread that owns the [`Context`]. Returning `Err` raises the error as the
/// host's pending exception; a failed [`ObjectOpResult`] is a refusal that
/// the dispatcher reports according to the strict-mode setting.
pub trait ProxyHandler: Send + Sync {
    /// Name of the proxy kind, for diagnostics
    fn family(&self) -> &'static str;

    /// [[OwnPropertyKeys]]
    fn own_property_keys(&self, cx: &mut Context, proxy: GcRef) -> VmResult<Vec<PropertyKey>>;

    /// Keys visited by `for-in`
    fn enumerate(&self, cx: &mut Context, proxy: GcRef) -> VmResult<Vec<PropertyKey>>;

    /// Keys returned by `Object.keys`
    fn get_own_enumerable_property_keys(
        &self,
        cx: &mut Context,
        proxy: GcRef,
    ) -> VmResult<Vec<PropertyKey>>;

    /// [[HasProperty]]
    fn has(&self, cx: &mut Context, proxy: GcRef, key: &PropertyKey) -> VmResult<bool>;

    /// HasOwnProperty
    fn has_own(&self, cx: &mut Context, proxy: GcRef, key: &PropertyKey) -> VmResult<bool>;

    /// [[Get]]
    fn get(
        &self,
        cx: &mut Context,
        proxy: GcRef,
        receiver: &Value,
        key: &PropertyKey,
    ) -> VmResult<Value>;

    /// [[Set]]
    fn set(
        &self,
        cx: &mut Context,
        proxy: GcRef,
        key: &PropertyKey,
        value: &Value,
        receiver: &Value,
    ) -> VmResult<ObjectOpResult>;

    /// [[Delete]]
    fn delete(&self, cx: &mut Context, proxy: GcRef, key: &PropertyKey)
    -> VmResult<ObjectOpResult>;

    /// [[DefineOwnProperty]]
    fn define_property(
        &self,
        cx: &mut Context,
        proxy: GcRef,
        key: &PropertyKey,
        desc: &PropertyDescriptor,
    ) -> VmResult<ObjectOpResult>;

    /// [[PreventExtensions]]
    fn prevent_extensions(&self, cx: &mut Context, proxy: GcRef) -> VmResult<ObjectOpResult>;

    /// [[IsExtensible]]
    fn is_extensible(&self, cx: &mut Context, proxy: GcRef) -> VmResult<bool>;

    /// Whether [[GetPrototypeOf]] is ordinary, and if so the prototype
    fn get_prototype_if_ordinary(&self, cx: &mut Context, proxy: GcRef)
    -> VmResult<PrototypeLookup>;

    /// Called once by the collector when the proxy is reclaimed.
    ///
    /// Must not touch the heap: other cells may already be gone.
    fn finalize(&self, proxy: &ProxyObject);
}

/// A proxy cell in the host heap
pub struct ProxyObject {
    handler: Arc<dyn ProxyHandler>,
    private: ProxyPrivate,
    prototype: Option<GcRef>,
}

impl ProxyObject {
    pub(crate) fn new(
        handler: Arc<dyn ProxyHandler>,
        private: ProxyPrivate,
        prototype: Option<GcRef>,
    ) -> Self {
        Self {
            handler,
            private,
            prototype,
        }
    }

    /// The trap set
    pub fn handler(&self) -> &Arc<dyn ProxyHandler> {
        &self.handler
    }

    /// The private slot
    pub fn private(&self) -> &ProxyPrivate {
        &self.private
    }

    /// Prototype fixed at creation
    pub fn static_prototype(&self) -> Option<GcRef> {
        self.prototype
    }
}

impl std::fmt::Debug for ProxyObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Proxy {{ family: {} }}", self.handler.family())
    }
}
