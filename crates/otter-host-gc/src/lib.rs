//! # Otter Host GC
//!
//! Stop-the-world mark/sweep collector for the Otter host runtime.
//!
//! ## Design
//!
//! - **Slot heap**: cells live in a slot vector addressed by generational
//!   [`GcRef`] handles, so a stale handle never aliases a reused slot
//! - **Tri-color marking**: white/gray/black marks on each cell's [`GcHeader`]
//! - **Finalization**: unreachable cells get [`GcTraceable::finalize`] exactly
//!   once before they are dropped, both on sweep and on heap teardown

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod heap;
pub mod object;

pub use heap::{GcRef, Heap, HeapStats};
pub use object::{GcHeader, GcTraceable, MarkColor};
