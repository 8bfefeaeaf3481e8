//! Draw ordering for the depth and base passes.
//!
//! Depth-only passes draw front to back along an axis so early depth
//! rejection kicks in. The base pass groups draws by shader variants to
//! minimize state changes. Both orders are stable: equal keys keep their
//! incoming relative order.

use glam::Vec3;
use rdst::RadixSort;
use super::pool::SubMeshId;
use super::{ObjectPool, SubMeshPool};

/// Sort sub-meshes by ascending `dot(owner translation, axis)`.
///
/// Each key packs the order-preserving distance bits above the incoming
/// position, so the radix sort yields the same order as a stable sort.
/// Sub-meshes whose owner is gone sort last.
pub fn sort_front_to_back(
    indices: &mut Vec<SubMeshId>,
    axis: Vec3,
    sub_meshes: &SubMeshPool,
    objects: &ObjectPool,
) {
    if indices.len() < 2 {
        return;
    }

    let mut keys: Vec<u64> = indices
        .iter()
        .enumerate()
        .map(|(position, &id)| {
            let distance = sub_meshes
                .get(id)
                .and_then(|sub_mesh| objects.get(sub_mesh.object()))
                .map(|object| object.translation().dot(axis))
                .unwrap_or(f32::INFINITY);
            (u64::from(order_preserving_bits(distance)) << 32) | position as u64
        })
        .collect();
    keys.radix_sort_unstable();

    let incoming = std::mem::take(indices);
    indices.extend(keys.iter().map(|&key| incoming[(key & 0xFFFF_FFFF) as usize]));
}

/// Stable sort grouping sub-meshes by material shader variants.
///
/// Order: no material first, then vertex variant id, then pixel variant id.
pub fn sort_by_material(indices: &mut [SubMeshId], sub_meshes: &SubMeshPool) {
    indices.sort_by_key(|&id| material_sort_key(sub_meshes, id));
}

fn material_sort_key(sub_meshes: &SubMeshPool, id: SubMeshId) -> Option<(Option<u32>, Option<u32>)> {
    sub_meshes
        .get(id)
        .and_then(|sub_mesh| sub_mesh.material())
        .map(|material| material.variant_key())
}

/// Map an `f32` to a `u32` whose unsigned order matches the float order.
/// NaN sorts after every other value.
pub fn order_preserving_bits(value: f32) -> u32 {
    let value = if value.is_nan() { f32::INFINITY } else { value };
    let bits = value.to_bits();
    if bits & 0x8000_0000 != 0 {
        !bits
    } else {
        bits | 0x8000_0000
    }
}

#[cfg(test)]
#[path = "sorting_tests.rs"]
mod tests;
