//! Per-view visibility: frustum culling of objects, then gathering of their sub-meshes.

use crate::camera::{BoundingSphere, Frustum};
use crate::utils::BitSet;
use super::pool::{ObjectId, PoolHandle, SubMeshId};
use super::{ObjectPool, SubMeshPool};

/// Visible-object set and visible sub-mesh list of the view being drawn
///
/// Both are rebuilt from scratch by every `compute_visibility()` call; the
/// storage is kept between calls to avoid reallocating each frame.
#[derive(Debug, Default)]
pub struct VisibilityStage {
    visible_objects: BitSet,
    visible_sub_meshes: Vec<SubMeshId>,
}

impl VisibilityStage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cull every valid object against `frustum`, then collect the valid
    /// sub-meshes of the visible objects in slot order.
    pub fn compute_visibility(
        &mut self,
        frustum: &Frustum,
        objects: &ObjectPool,
        sub_meshes: &SubMeshPool,
    ) -> &[SubMeshId] {
        self.visible_objects.resize(objects.capacity());
        self.visible_objects.clear_all();
        for (id, object) in objects.iter() {
            if sphere_visible(frustum, object.world_bounds()) {
                self.visible_objects.set(id.index() as usize);
            }
        }

        self.visible_sub_meshes.clear();
        for (id, sub_mesh) in sub_meshes.iter() {
            if self.is_object_visible(sub_mesh.object()) {
                self.visible_sub_meshes.push(id);
            }
        }

        &self.visible_sub_meshes
    }

    /// Visibility bit per object slot, sized to the object pool capacity
    pub fn visible_objects(&self) -> &BitSet {
        &self.visible_objects
    }

    pub fn is_object_visible(&self, object: ObjectId) -> bool {
        self.visible_objects.get(object.index() as usize)
    }

    pub fn visible_sub_meshes(&self) -> &[SubMeshId] {
        &self.visible_sub_meshes
    }
}

/// Sphere/frustum test. Degenerate bounds are treated as visible.
pub fn sphere_visible(frustum: &Frustum, sphere: &BoundingSphere) -> bool {
    sphere.is_degenerate() || frustum.intersects_sphere(sphere)
}

#[cfg(test)]
#[path = "visibility_tests.rs"]
mod tests;
