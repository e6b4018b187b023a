//! Proxy private slot and lifecycle
//!
//! A mapping proxy's slot owns one strong reference to the mapping from the
//! moment it is created until the collector finalizes the proxy:
//!
//! ```text
//! Unattached --wrap_dict--> Live --finalize--> Finalized
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use otter_foreign::DictRef;
use otter_host::{Context, GcRef, ProxyHandler};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{BridgeError, BridgeResult};

/// Lifecycle state of a mapping proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyState {
    /// Reference acquired; the proxy is not yet reachable from the host
    Unattached,
    /// The proxy is allocated and traps operate on the mapping
    Live,
    /// The reference was released; traps fail with `Finalized`
    Finalized,
}

#[derive(Debug)]
struct SlotInner {
    dict: Option<DictRef>,
    state: ProxyState,
}

/// Private slot of a mapping proxy
#[derive(Debug)]
pub struct ForeignSlot {
    inner: Mutex<SlotInner>,
    extensible: AtomicBool,
}

impl ForeignSlot {
    /// Take ownership of `dict`'s reference
    pub fn new(dict: DictRef) -> Self {
        Self {
            inner: Mutex::new(SlotInner {
                dict: Some(dict),
                state: ProxyState::Unattached,
            }),
            extensible: AtomicBool::new(true),
        }
    }

    /// Lifecycle state
    pub fn state(&self) -> ProxyState {
        self.inner.lock().state
    }

    pub(crate) fn attach(&self) {
        let mut inner = self.inner.lock();
        if inner.state == ProxyState::Unattached {
            inner.state = ProxyState::Live;
        }
    }

    /// Run `f` with a borrowed reference to the mapping
    pub fn with_dict<R>(&self, f: impl FnOnce(&DictRef) -> R) -> BridgeResult<R> {
        let inner = self.inner.lock();
        match &inner.dict {
            Some(dict) => Ok(f(dict)),
            None => {
                warn!(target: "otter::dict_proxy", "trap reached a finalized mapping proxy");
                Err(BridgeError::Finalized)
            }
        }
    }

    /// Fail with `Finalized` once the reference is gone
    pub fn check_live(&self) -> BridgeResult<()> {
        self.with_dict(|_| ())
    }

    /// Give up the owning reference. Only the first call yields it.
    pub(crate) fn release(&self) -> Option<DictRef> {
        let mut inner = self.inner.lock();
        inner.state = ProxyState::Finalized;
        inner.dict.take()
    }

    /// Host-side extensibility flag
    pub fn is_extensible(&self) -> bool {
        self.extensible.load(Ordering::Acquire)
    }

    /// Clear the extensibility flag. The mapping itself is unaffected.
    pub fn prevent_extensions(&self) {
        self.extensible.store(false, Ordering::Release);
    }
}

/// Expose `dict` to the host as a proxy served by `handler`.
///
/// The proxy takes over the given reference and inherits from the realm's
/// `Object.prototype`.
pub fn wrap_dict(cx: &mut Context, handler: Arc<dyn ProxyHandler>, dict: DictRef) -> GcRef {
    let refcount = dict.refcount();
    let slot = Arc::new(ForeignSlot::new(dict));
    let prototype = Some(cx.object_prototype());
    let proxy = cx.new_proxy(handler, slot.clone(), prototype);
    slot.attach();

    debug!(
        target: "otter::dict_proxy",
        proxy = %proxy,
        refcount,
        "wrapped foreign mapping"
    );
    proxy
}
