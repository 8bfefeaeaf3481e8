//! Small containers shared by the scene pools and stages.

pub mod bit_set;
pub mod slot_allocator;

pub use bit_set::BitSet;
pub use slot_allocator::SlotAllocator;
