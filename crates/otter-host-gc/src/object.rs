//! GC cell header and the tracing trait

use std::sync::atomic::{AtomicU8, Ordering};

use crate::heap::GcRef;

/// Mark color for tri-color marking
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkColor {
    /// Not yet visited
    White = 0,
    /// In worklist
    Gray = 1,
    /// Fully scanned
    Black = 2,
}

/// Per-cell GC header
pub struct GcHeader {
    /// Mark bits for tri-color marking
    mark: AtomicU8,
    /// Object type tag, supplied by the traced value
    tag: u8,
}

impl GcHeader {
    /// Create a new header
    pub const fn new(tag: u8) -> Self {
        Self {
            mark: AtomicU8::new(MarkColor::White as u8),
            tag,
        }
    }

    /// Get mark color
    pub fn mark(&self) -> MarkColor {
        match self.mark.load(Ordering::Acquire) {
            0 => MarkColor::White,
            1 => MarkColor::Gray,
            _ => MarkColor::Black,
        }
    }

    /// Set mark color
    pub fn set_mark(&self, color: MarkColor) {
        self.mark.store(color as u8, Ordering::Release);
    }

    /// Get object tag
    pub fn tag(&self) -> u8 {
        self.tag
    }
}

impl std::fmt::Debug for GcHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcHeader")
            .field("mark", &self.mark())
            .field("tag", &self.tag)
            .finish()
    }
}

/// Values that can live in a [`crate::Heap`].
pub trait GcTraceable {
    /// Whether `trace` can ever report children. Leaf types skip the scan.
    const NEEDS_TRACE: bool;

    /// Report every heap reference held by this value.
    fn trace(&self, tracer: &mut dyn FnMut(GcRef));

    /// Type tag stored in the cell header.
    fn tag(&self) -> u8 {
        0
    }

    /// Called once when the collector reclaims the cell, before it is dropped.
    ///
    /// Must not touch other heap cells: they may already be swept.
    fn finalize(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_marking() {
        let header = GcHeader::new(3);
        assert_eq!(header.mark(), MarkColor::White);
        assert_eq!(header.tag(), 3);

        header.set_mark(MarkColor::Gray);
        assert_eq!(header.mark(), MarkColor::Gray);

        header.set_mark(MarkColor::Black);
        assert_eq!(header.mark(), MarkColor::Black);
    }
}
