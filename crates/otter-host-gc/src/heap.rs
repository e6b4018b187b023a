//! Slot heap with stop-the-world mark/sweep collection

use std::time::{Duration, Instant};

use crate::object::{GcHeader, GcTraceable, MarkColor};

/// Handle to a heap cell.
///
/// The generation is bumped every time a slot is freed, so handles to a
/// reclaimed cell stop resolving instead of aliasing the next occupant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GcRef {
    index: u32,
    generation: u32,
}

impl GcRef {
    /// Slot index of this handle
    pub fn index(self) -> u32 {
        self.index
    }

    /// Generation of this handle
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl std::fmt::Display for GcRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

/// An occupied cell: header followed by the value.
struct Allocation<T> {
    header: GcHeader,
    value: T,
}

enum Slot<T> {
    Occupied {
        generation: u32,
        allocation: Box<Allocation<T>>,
    },
    Free,
}

/// Collection statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeapStats {
    /// Live cells
    pub live: usize,
    /// Cells allocated over the heap's lifetime
    pub total_allocated: usize,
    /// Collections performed
    pub collections: usize,
    /// Cells reclaimed by the last collection
    pub last_reclaimed: usize,
    /// Cells finalized over the heap's lifetime
    pub total_finalized: usize,
    /// Pause time of the last collection
    pub last_pause: Duration,
}

/// A tracing heap of `T` cells.
pub struct Heap<T: GcTraceable> {
    slots: Vec<Slot<T>>,
    /// Free slots, each paired with the generation its next cell gets
    free_list: Vec<GcRef>,
    live: usize,
    allocated_since_gc: usize,
    gc_threshold: usize,
    stats: HeapStats,
}

impl<T: GcTraceable> Heap<T> {
    /// Default number of allocations between automatic collections
    pub const DEFAULT_THRESHOLD: usize = 4096;

    /// Create an empty heap
    pub fn new() -> Self {
        Self::with_threshold(Self::DEFAULT_THRESHOLD)
    }

    /// Create an empty heap that asks for collection every `threshold` allocations
    pub fn with_threshold(threshold: usize) -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            live: 0,
            allocated_since_gc: 0,
            gc_threshold: threshold.max(1),
            stats: HeapStats::default(),
        }
    }

    /// Allocate a new cell
    pub fn allocate(&mut self, value: T) -> GcRef {
        let allocation = Box::new(Allocation {
            header: GcHeader::new(value.tag()),
            value,
        });

        let gc_ref = match self.free_list.pop() {
            Some(gc_ref) => {
                self.slots[gc_ref.index as usize] = Slot::Occupied {
                    generation: gc_ref.generation,
                    allocation,
                };
                gc_ref
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot::Occupied {
                    generation: 0,
                    allocation,
                });
                GcRef {
                    index,
                    generation: 0,
                }
            }
        };

        self.live += 1;
        self.allocated_since_gc += 1;
        self.stats.total_allocated += 1;
        gc_ref
    }

    fn allocation(&self, gc_ref: GcRef) -> Option<&Allocation<T>> {
        match self.slots.get(gc_ref.index as usize)? {
            Slot::Occupied {
                generation,
                allocation,
            } if *generation == gc_ref.generation => Some(allocation),
            _ => None,
        }
    }

    /// Resolve a handle
    pub fn get(&self, gc_ref: GcRef) -> Option<&T> {
        self.allocation(gc_ref).map(|a| &a.value)
    }

    /// Resolve a handle mutably
    pub fn get_mut(&mut self, gc_ref: GcRef) -> Option<&mut T> {
        match self.slots.get_mut(gc_ref.index as usize)? {
            Slot::Occupied {
                generation,
                allocation,
            } if *generation == gc_ref.generation => Some(&mut allocation.value),
            _ => None,
        }
    }

    /// Header of a live cell
    pub fn header(&self, gc_ref: GcRef) -> Option<&GcHeader> {
        self.allocation(gc_ref).map(|a| &a.header)
    }

    /// Whether the handle still resolves
    pub fn is_live(&self, gc_ref: GcRef) -> bool {
        self.allocation(gc_ref).is_some()
    }

    /// Number of live cells
    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Whether enough allocations happened since the last collection
    pub fn should_collect(&self) -> bool {
        self.allocated_since_gc >= self.gc_threshold
    }

    /// Statistics snapshot
    pub fn stats(&self) -> HeapStats {
        HeapStats {
            live: self.live,
            ..self.stats
        }
    }

    /// Full mark/sweep collection. Returns the number of reclaimed cells.
    ///
    /// Stale or dangling roots are ignored.
    pub fn collect(&mut self, roots: &[GcRef]) -> usize {
        let start = Instant::now();

        #[cfg(feature = "gc_logging")]
        tracing::debug!(
            target: "otter::gc",
            roots = roots.len(),
            objects = self.live,
            "GC cycle starting"
        );

        self.reset_marks();
        self.mark(roots);
        let reclaimed = self.sweep();

        let elapsed = start.elapsed();
        self.allocated_since_gc = 0;
        self.stats.collections += 1;
        self.stats.last_reclaimed = reclaimed;
        self.stats.last_pause = elapsed;

        #[cfg(feature = "gc_logging")]
        tracing::info!(
            target: "otter::gc",
            collection = self.stats.collections,
            reclaimed = reclaimed,
            live_objects = self.live,
            pause_us = elapsed.as_micros() as u64,
            "GC cycle complete"
        );

        reclaimed
    }

    fn reset_marks(&self) {
        for slot in &self.slots {
            if let Slot::Occupied { allocation, .. } = slot {
                allocation.header.set_mark(MarkColor::White);
            }
        }
    }

    fn mark(&self, roots: &[GcRef]) {
        let mut worklist: Vec<GcRef> = Vec::with_capacity(roots.len());
        for &root in roots {
            self.shade(root, &mut worklist);
        }

        while let Some(gc_ref) = worklist.pop() {
            let Some(allocation) = self.allocation(gc_ref) else {
                continue;
            };
            if T::NEEDS_TRACE {
                let mut children = Vec::new();
                allocation.value.trace(&mut |child| children.push(child));
                for child in children {
                    self.shade(child, &mut worklist);
                }
            }
            allocation.header.set_mark(MarkColor::Black);
        }
    }

    fn shade(&self, gc_ref: GcRef, worklist: &mut Vec<GcRef>) {
        if let Some(header) = self.header(gc_ref) {
            if header.mark() == MarkColor::White {
                header.set_mark(MarkColor::Gray);
                worklist.push(gc_ref);
            }
        }
    }

    fn sweep(&mut self) -> usize {
        let mut reclaimed = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let dead = matches!(
                slot,
                Slot::Occupied { allocation, .. } if allocation.header.mark() == MarkColor::White
            );
            if !dead {
                continue;
            }

            if let Slot::Occupied {
                generation,
                allocation,
            } = std::mem::replace(slot, Slot::Free)
            {
                allocation.value.finalize();
                self.stats.total_finalized += 1;
                self.free_list.push(GcRef {
                    index: index as u32,
                    generation: generation.wrapping_add(1),
                });
                reclaimed += 1;
            }
        }
        self.live -= reclaimed;
        reclaimed
    }
}

impl<T: GcTraceable> Default for Heap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: GcTraceable> Drop for Heap<T> {
    fn drop(&mut self) {
        for slot in self.slots.drain(..) {
            if let Slot::Occupied { allocation, .. } = slot {
                allocation.value.finalize();
            }
        }
    }
}

impl<T: GcTraceable> std::fmt::Debug for Heap<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Heap")
            .field("live", &self.live)
            .field("slots", &self.slots.len())
            .field("collections", &self.stats.collections)
            .finish()
    }
}
