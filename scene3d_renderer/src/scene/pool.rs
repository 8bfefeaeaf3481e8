//! Sparse pools with lowest-free slot reuse.
//!
//! Slot indices are the identity of views, objects and sub-meshes: they
//! index the per-frame visibility bitset and the constant block tables.
//! Released slots are never compacted, so a handle keeps addressing the
//! same slot until that slot is handed out again.

use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use crate::utils::{BitSet, SlotAllocator};

/// Typed slot index handed out by a `SparsePool`
pub trait PoolHandle: Copy + Eq + Ord + Hash + Debug {
    fn from_index(index: u32) -> Self;

    fn index(self) -> u32;
}

macro_rules! new_handle_type {
    ($(#[$meta:meta])* $vis:vis struct $name:ident;) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $vis struct $name(u32);

        impl $name {
            /// Handle that never addresses a live slot
            pub const INVALID: Self = Self(u32::MAX);
        }

        impl PoolHandle for $name {
            fn from_index(index: u32) -> Self {
                Self(index)
            }

            fn index(self) -> u32 {
                self.0
            }
        }
    };
}

new_handle_type! {
    /// Handle to a view in the scene's view pool
    pub struct ViewId;
}

new_handle_type! {
    /// Handle to an object in the scene's object pool
    pub struct ObjectId;
}

new_handle_type! {
    /// Handle to a sub-mesh in the scene's sub-mesh pool
    pub struct SubMeshId;
}

/// Arena of `T` addressed by slot handles
///
/// Invariant: `valid` has a bit for every slot of `elements`, and a slot is
/// live iff its bit is set.
pub struct SparsePool<K: PoolHandle, T> {
    elements: Vec<T>,
    valid: BitSet,
    allocator: SlotAllocator,
    _marker: PhantomData<K>,
}

impl<K: PoolHandle, T: Default> Default for SparsePool<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PoolHandle, T: Default> SparsePool<K, T> {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            valid: BitSet::new(),
            allocator: SlotAllocator::new(),
            _marker: PhantomData,
        }
    }

    /// Allocate a default-initialized element in the lowest free slot
    pub fn allocate(&mut self) -> K {
        self.insert(T::default())
    }

    /// Store `value` in the lowest free slot
    pub fn insert(&mut self, value: T) -> K {
        let index = self.allocator.alloc() as usize;
        if index < self.elements.len() {
            self.elements[index] = value;
        } else {
            self.elements.push(value);
        }
        self.valid.set(index);
        K::from_index(index as u32)
    }

    /// Release a slot, returning its element.
    ///
    /// Releasing an invalid or stale handle does nothing and returns `None`.
    pub fn release(&mut self, handle: K) -> Option<T> {
        if !self.is_valid(handle) {
            return None;
        }
        let index = handle.index() as usize;
        self.valid.unset(index);
        self.allocator.free(handle.index());
        Some(std::mem::take(&mut self.elements[index]))
    }
}

impl<K: PoolHandle, T> SparsePool<K, T> {
    pub fn is_valid(&self, handle: K) -> bool {
        self.valid.get(handle.index() as usize)
    }

    pub fn get(&self, handle: K) -> Option<&T> {
        if self.is_valid(handle) {
            self.elements.get(handle.index() as usize)
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, handle: K) -> Option<&mut T> {
        if self.is_valid(handle) {
            self.elements.get_mut(handle.index() as usize)
        } else {
            None
        }
    }

    /// Number of live elements
    pub fn len(&self) -> usize {
        self.allocator.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots ever used, live or released
    pub fn capacity(&self) -> usize {
        self.elements.len()
    }

    /// Validity bit per slot
    pub fn validity(&self) -> &BitSet {
        &self.valid
    }

    /// Live handles in slot order
    pub fn handles(&self) -> impl Iterator<Item = K> + '_ {
        self.valid.iter_ones().map(|index| K::from_index(index as u32))
    }

    /// Live elements in slot order
    pub fn iter(&self) -> impl Iterator<Item = (K, &T)> + '_ {
        self.valid
            .iter_ones()
            .map(move |index| (K::from_index(index as u32), &self.elements[index]))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (K, &mut T)> + '_ {
        let valid = &self.valid;
        self.elements
            .iter_mut()
            .enumerate()
            .filter(move |(index, _)| valid.get(*index))
            .map(|(index, element)| (K::from_index(index as u32), element))
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
