use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Allocates and recycles `u32` slot indices, lowest index first.
///
/// Backs the scene pools: a released index is handed out again only after
/// every lower released index has been reused, so the live indices stay
/// packed toward the front of the backing storage.
///
/// # Example
///
/// ```ignore
/// let mut alloc = SlotAllocator::new();
/// let a = alloc.alloc();  // 0
/// let b = alloc.alloc();  // 1
/// let c = alloc.alloc();  // 2
/// alloc.free(c);
/// alloc.free(a);
/// assert_eq!(alloc.alloc(), 0);  // lowest released index first
/// ```
pub struct SlotAllocator {
    free_list: BinaryHeap<Reverse<u32>>,
    next_id: u32,
    len: u32,
}

impl SlotAllocator {
    /// Create a new empty allocator
    pub fn new() -> Self {
        Self {
            free_list: BinaryHeap::new(),
            next_id: 0,
            len: 0,
        }
    }

    /// Allocate the lowest available slot index
    pub fn alloc(&mut self) -> u32 {
        self.len += 1;
        match self.free_list.pop() {
            Some(Reverse(id)) => id,
            None => {
                let id = self.next_id;
                self.next_id += 1;
                id
            }
        }
    }

    /// Return a slot index to the pool for reuse.
    ///
    /// The caller guarantees `id` is currently allocated.
    pub fn free(&mut self, id: u32) {
        debug_assert!(id < self.next_id, "freeing an unallocated slot: {}", id);
        self.len -= 1;
        self.free_list.push(Reverse(id));
    }

    /// Highest index ever allocated + 1.
    ///
    /// This is the minimum capacity the backing storage must have
    /// to accommodate all allocated indices.
    pub fn high_water_mark(&self) -> u32 {
        self.next_id
    }

    /// Number of currently allocated slots
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Whether no slots are currently allocated
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for SlotAllocator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "slot_allocator_tests.rs"]
mod tests;
