//! SceneObject: one renderable placed in the world.
//!
//! Holds the transform, world bounds and geometry buffers shared by all of
//! its sub-meshes. Skinned objects also carry a bone palette.

use std::sync::Arc;
use glam::{Mat4, Vec3};
use crate::camera::BoundingSphere;
use crate::device::{Buffer, VertexDescription};

/// How an object's instance constants are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderKind {
    /// One world transform block per object
    Static,
    /// One bone palette block per sub-mesh
    Skinned,
}

/// Renderable object
#[derive(Clone, Default)]
pub struct SceneObject {
    transform: Mat4,
    world_bounds: BoundingSphere,

    vertex_buffer: Option<Arc<dyn Buffer>>,
    index_buffer: Option<Arc<dyn Buffer>>,
    vertex_stride: u32,
    vertex_description: Option<Arc<dyn VertexDescription>>,

    bone_palette: Option<Arc<[Mat4]>>,
    bone_count: u8,
}

impl SceneObject {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== SETTERS =====

    /// Set the local to world transform
    pub fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
    }

    /// Set the world-space bounding sphere used for culling
    pub fn set_world_bounds(&mut self, bounds: BoundingSphere) {
        self.world_bounds = bounds;
    }

    pub fn set_vertex_data(
        &mut self,
        buffer: Option<Arc<dyn Buffer>>,
        description: Option<Arc<dyn VertexDescription>>,
        stride: u32,
    ) {
        self.vertex_buffer = buffer;
        self.vertex_description = description;
        self.vertex_stride = stride;
    }

    pub fn set_index_buffer(&mut self, buffer: Option<Arc<dyn Buffer>>) {
        self.index_buffer = buffer;
    }

    /// Set the world-space bone matrices and the number of bones influencing this object.
    ///
    /// A bone count of zero renders the object as static.
    pub fn set_bone_data(&mut self, palette: Option<Arc<[Mat4]>>, bone_count: u8) {
        self.bone_palette = palette;
        self.bone_count = bone_count;
    }

    // ===== GETTERS =====

    pub fn transform(&self) -> &Mat4 {
        &self.transform
    }

    /// World-space position of the object origin
    pub fn translation(&self) -> Vec3 {
        self.transform.w_axis.truncate()
    }

    pub fn world_bounds(&self) -> &BoundingSphere {
        &self.world_bounds
    }

    pub fn vertex_buffer(&self) -> Option<&Arc<dyn Buffer>> {
        self.vertex_buffer.as_ref()
    }

    pub fn index_buffer(&self) -> Option<&Arc<dyn Buffer>> {
        self.index_buffer.as_ref()
    }

    pub fn vertex_stride(&self) -> u32 {
        self.vertex_stride
    }

    pub fn vertex_description(&self) -> Option<&Arc<dyn VertexDescription>> {
        self.vertex_description.as_ref()
    }

    pub fn bone_palette(&self) -> Option<&Arc<[Mat4]>> {
        self.bone_palette.as_ref()
    }

    pub fn bone_count(&self) -> u8 {
        self.bone_count
    }

    /// Skinned iff bones influence the object and a palette is present
    pub fn render_kind(&self) -> RenderKind {
        if self.bone_count > 0 && self.bone_palette.is_some() {
            RenderKind::Skinned
        } else {
            RenderKind::Static
        }
    }
}
