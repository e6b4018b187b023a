//! Reference-counted ordered mappings

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::error::{ForeignError, ForeignResult};
use crate::value::{ForeignKey, ForeignValue};

struct DictObject {
    entries: Mutex<IndexMap<ForeignKey, ForeignValue>>,
    frozen: AtomicBool,
}

/// A strong reference to a foreign mapping.
///
/// Each `DictRef` is one reference count; clone to acquire another, drop to
/// release it. Iteration follows insertion order. Removing a key keeps the
/// order of the remaining entries.
#[derive(Clone)]
pub struct DictRef(Arc<DictObject>);

impl DictRef {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self(Arc::new(DictObject {
            entries: Mutex::new(IndexMap::new()),
            frozen: AtomicBool::new(false),
        }))
    }

    /// Current reference count
    pub fn refcount(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &DictRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.entries.lock().len()
    }

    /// Whether the mapping is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `d.get(key)`: a new reference to the stored value
    pub fn get_item(&self, key: &ForeignKey) -> Option<ForeignValue> {
        self.0.entries.lock().get(key).cloned()
    }

    /// `key in d`
    pub fn contains_key(&self, key: &ForeignKey) -> bool {
        self.0.entries.lock().contains_key(key)
    }

    /// `d[key] = value`. Overwriting keeps the key's position.
    pub fn set_item(&self, key: ForeignKey, value: ForeignValue) -> ForeignResult<()> {
        self.check_mutable()?;
        // The displaced value is dropped after the lock is released
        let previous = self.0.entries.lock().insert(key, value);
        drop(previous);
        Ok(())
    }

    /// `del d[key]`
    pub fn del_item(&self, key: &ForeignKey) -> ForeignResult<()> {
        self.check_mutable()?;
        let removed = self.0.entries.lock().shift_remove(key);
        match removed {
            Some(_) => Ok(()),
            None => Err(ForeignError::key_error(key)),
        }
    }

    /// Remove every entry
    pub fn clear(&self) -> ForeignResult<()> {
        self.check_mutable()?;
        let entries = std::mem::take(&mut *self.0.entries.lock());
        drop(entries);
        Ok(())
    }

    /// Snapshot of the keys in iteration order
    pub fn keys(&self) -> Vec<ForeignKey> {
        self.0.entries.lock().keys().cloned().collect()
    }

    /// Make the mapping read-only. Irreversible.
    pub fn freeze(&self) {
        self.0.frozen.store(true, Ordering::Release);
    }

    /// Whether the mapping is read-only
    pub fn is_frozen(&self) -> bool {
        self.0.frozen.load(Ordering::Acquire)
    }

    fn check_mutable(&self) -> ForeignResult<()> {
        if self.is_frozen() {
            Err(ForeignError::type_error(
                "'mappingproxy' object does not support item assignment",
            ))
        } else {
            Ok(())
        }
    }
}

impl Default for DictRef {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DictRef {
    // Entries are not printed: a mapping may contain itself.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DictRef")
            .field("ptr", &Arc::as_ptr(&self.0))
            .field("len", &self.len())
            .field("refcount", &self.refcount())
            .field("frozen", &self.is_frozen())
            .finish()
    }
}

impl<K, V> FromIterator<(K, V)> for DictRef
where
    K: Into<ForeignKey>,
    V: Into<ForeignValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let entries: IndexMap<ForeignKey, ForeignValue> = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self(Arc::new(DictObject {
            entries: Mutex::new(entries),
            frozen: AtomicBool::new(false),
        }))
    }
}
