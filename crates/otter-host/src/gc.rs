//! Garbage collection support
//!
//! Heap cells of the host runtime, traced by otter-host-gc.

pub use otter_host_gc::{GcHeader, GcRef, GcTraceable, HeapStats, MarkColor};

use crate::object::JsObject;
use crate::proxy::ProxyObject;

/// Object type tags
pub mod tags {
    /// Ordinary object
    pub const ORDINARY: u8 = 1;
    /// Proxy object
    pub const PROXY: u8 = 2;
}

/// A host heap cell
#[derive(Debug)]
pub enum HeapObject {
    /// Ordinary object with its own property storage
    Ordinary(JsObject),
    /// Native proxy; storage lives behind its handler
    Proxy(ProxyObject),
}

impl HeapObject {
    /// Ordinary object, if this is one
    pub fn as_ordinary(&self) -> Option<&JsObject> {
        match self {
            Self::Ordinary(obj) => Some(obj),
            Self::Proxy(_) => None,
        }
    }

    /// Proxy, if this is one
    pub fn as_proxy(&self) -> Option<&ProxyObject> {
        match self {
            Self::Proxy(proxy) => Some(proxy),
            Self::Ordinary(_) => None,
        }
    }
}

/// The host heap
pub type Heap = otter_host_gc::Heap<HeapObject>;

impl GcTraceable for HeapObject {
    const NEEDS_TRACE: bool = true;

    fn trace(&self, tracer: &mut dyn FnMut(GcRef)) {
        match self {
            Self::Ordinary(obj) => obj.trace(tracer),
            // The private slot holds foreign state only; the static
            // prototype is the one traced edge.
            Self::Proxy(proxy) => {
                if let Some(proto) = proxy.static_prototype() {
                    tracer(proto);
                }
            }
        }
    }

    fn tag(&self) -> u8 {
        match self {
            Self::Ordinary(_) => tags::ORDINARY,
            Self::Proxy(_) => tags::PROXY,
        }
    }

    fn finalize(&self) {
        if let Self::Proxy(proxy) = self {
            proxy.handler().finalize(proxy);
        }
    }
}
