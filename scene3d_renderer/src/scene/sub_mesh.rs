//! SubMeshData: one draw call's worth of an object.

use std::sync::Arc;
use crate::device::{DrawIndexedArgs, PrimitiveType};
use crate::resource::Material;
use super::pool::ObjectId;

/// Range of an object's index buffer drawn with one material
#[derive(Clone)]
pub struct SubMeshData {
    object: ObjectId,

    primitive_type: PrimitiveType,
    primitive_count: u32,
    start_vertex: u32,
    vertex_range: u32,
    start_index: u32,

    material: Option<Arc<Material>>,
    skinning_palette_map: Option<Arc<[u8]>>,
}

impl Default for SubMeshData {
    /// Detached sub-mesh referencing no object
    fn default() -> Self {
        Self::new(ObjectId::INVALID)
    }
}

impl SubMeshData {
    pub fn new(object: ObjectId) -> Self {
        Self {
            object,
            primitive_type: PrimitiveType::TriangleList,
            primitive_count: 0,
            start_vertex: 0,
            vertex_range: 0,
            start_index: 0,
            material: None,
            skinning_palette_map: None,
        }
    }

    // ===== SETTERS =====

    pub fn set_primitive_type(&mut self, primitive_type: PrimitiveType) {
        self.primitive_type = primitive_type;
    }

    pub fn set_primitive_count(&mut self, count: u32) {
        self.primitive_count = count;
    }

    /// Set the vertex window referenced by this sub-mesh's indices
    pub fn set_vertex_range(&mut self, start_vertex: u32, vertex_range: u32) {
        self.start_vertex = start_vertex;
        self.vertex_range = vertex_range;
    }

    pub fn set_start_index(&mut self, start_index: u32) {
        self.start_index = start_index;
    }

    pub fn set_material(&mut self, material: Option<Arc<Material>>) {
        self.material = material;
    }

    /// Set the table mapping shader bone slots to object bone palette entries
    pub fn set_skinning_palette_map(&mut self, map: Option<Arc<[u8]>>) {
        self.skinning_palette_map = map;
    }

    // ===== GETTERS =====

    /// Owning object
    pub fn object(&self) -> ObjectId {
        self.object
    }

    pub fn primitive_type(&self) -> PrimitiveType {
        self.primitive_type
    }

    pub fn primitive_count(&self) -> u32 {
        self.primitive_count
    }

    pub fn start_vertex(&self) -> u32 {
        self.start_vertex
    }

    pub fn vertex_range(&self) -> u32 {
        self.vertex_range
    }

    pub fn start_index(&self) -> u32 {
        self.start_index
    }

    pub fn material(&self) -> Option<&Arc<Material>> {
        self.material.as_ref()
    }

    pub fn skinning_palette_map(&self) -> Option<&Arc<[u8]>> {
        self.skinning_palette_map.as_ref()
    }

    /// Indexed draw arguments for this sub-mesh
    pub fn draw_args(&self) -> DrawIndexedArgs {
        DrawIndexedArgs {
            primitive_type: self.primitive_type,
            base_vertex: self.start_vertex,
            min_index: 0,
            vertex_count: self.vertex_range,
            start_index: self.start_index,
            primitive_count: self.primitive_count,
        }
    }
}
