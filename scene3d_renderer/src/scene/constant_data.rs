//! Per-frame shader constant blocks.
//!
//! Blocks live in N rotating buffer sets so the CPU never rewrites a block
//! the GPU may still be reading from an in-flight frame. Each frame the
//! stage advances to the next set and rewrites every view block and every
//! instance block from the current scene state.
//!
//! Matrices are stored row-major: a 4x4 block is the transpose of the glam
//! column-major matrix, a 3x4 instance block its first three rows.

use std::mem::size_of;
use std::sync::Arc;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2};
use crate::device::{BufferDesc, BufferUsage, ConstantBuffer, GraphicsDevice, MapHint};
use crate::engine_error;
use crate::error::Result;
use crate::utils::BitSet;
use super::lighting::SceneLighting;
use super::pool::{ObjectId, PoolHandle, SubMeshId, ViewId};
use super::scene_object::{RenderKind, SceneObject};
use super::{ObjectPool, SubMeshPool, ViewPool};

/// Bone matrices per skinned instance block
pub const BONE_COUNT_MAX: usize = 72;

pub const VIEW_GLOBAL_LABEL: &str = "view_global";
pub const BASE_PASS_VERTEX_LABEL: &str = "view_base_pass_vertex";
pub const BASE_PASS_PIXEL_LABEL: &str = "view_base_pass_pixel";
pub const SHADOW_VIEW_LABEL: &str = "shadow_view";
pub const STATIC_INSTANCE_LABEL: &str = "static_instance";
pub const SKINNED_INSTANCE_LABEL: &str = "skinned_instance";

// ===== BLOCK LAYOUTS =====

/// View global block (vertex slot 0)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ViewGlobalData {
    pub view_projection: [[f32; 4]; 4],
    /// World to view
    pub view: [[f32; 4]; 4],
}

/// Base pass vertex block (vertex slot 1)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BasePassVertexData {
    /// World to shadow map texture space
    pub shadow_texture_projection: [[f32; 4]; 4],
    /// Direction toward the light, in view space
    pub light_direction: [f32; 4],
    pub viewport_half_size: [f32; 4],
}

/// Base pass pixel block (pixel slot 0)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BasePassPixelData {
    pub ambient_top: [f32; 4],
    pub ambient_bottom: [f32; 4],
    pub directional_light: [f32; 4],
    pub inverse_shadow_map_size: [f32; 4],
}

/// Shadow depth pass view block (vertex slot 0)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ShadowViewData {
    pub view_projection: [[f32; 4]; 4],
}

/// One 3x4 world (or bone) matrix
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    pub rows: [[f32; 4]; 3],
}

impl InstanceData {
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let rows = matrix_rows(matrix);
        Self { rows: [rows[0], rows[1], rows[2]] }
    }
}

fn matrix_rows(matrix: &Mat4) -> [[f32; 4]; 4] {
    matrix.transpose().to_cols_array_2d()
}

// ===== FRAME INPUTS =====

/// Scene state the view blocks are built from
pub struct FrameInputs<'a> {
    pub lighting: &'a SceneLighting,
    /// Light view-projection per view slot
    pub shadow_view_projections: &'a [Mat4],
    pub shadows_enabled: bool,
    /// Clip space to shadow map texture space
    pub shadow_uv_transform: Mat4,
    /// Reciprocal shadow map size in texels, zero without a shadow map
    pub inverse_shadow_map_size: Vec2,
}

/// Outcome of one `swap_and_populate()`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConstantDataStats {
    pub static_blocks: u32,
    pub skinned_blocks: u32,
    /// Blocks that could not be created or uploaded
    pub failures: u32,
}

// ===== BUFFER SETS =====

/// Reusable block that is only readable once written this frame
#[derive(Default)]
struct BlockSlot {
    buffer: Option<Arc<dyn ConstantBuffer>>,
    ready: bool,
}

impl BlockSlot {
    fn write<T: Pod>(&mut self, device: &mut dyn GraphicsDevice, label: &'static str, data: &T) -> bool {
        self.ready = false;
        let buffer = match &self.buffer {
            Some(buffer) => buffer.clone(),
            None => match create_block(device, size_of::<T>(), label) {
                Ok(buffer) => {
                    self.buffer = Some(buffer.clone());
                    buffer
                }
                Err(error) => {
                    engine_error!("scene3d::ConstantData",
                        "Failed to create '{}' block: {}", label, error);
                    return false;
                }
            },
        };

        match buffer.upload(MapHint::Discard, bytemuck::bytes_of(data)) {
            Ok(()) => self.ready = true,
            Err(error) => {
                engine_error!("scene3d::ConstantData",
                    "Failed to upload '{}' block: {}", label, error);
            }
        }
        self.ready
    }

    fn get(&self) -> Option<&Arc<dyn ConstantBuffer>> {
        if self.ready {
            self.buffer.as_ref()
        } else {
            None
        }
    }
}

#[derive(Default)]
struct ViewBlocks {
    global: BlockSlot,
    base_pass_vertex: BlockSlot,
    base_pass_pixel: BlockSlot,
    shadow_view: BlockSlot,
}

impl ViewBlocks {
    fn invalidate(&mut self) {
        self.global.ready = false;
        self.base_pass_vertex.ready = false;
        self.base_pass_pixel.ready = false;
        self.shadow_view.ready = false;
    }
}

/// Blocks written during one frame
#[derive(Default)]
struct BufferSet {
    views: Vec<ViewBlocks>,
    static_blocks: Vec<Arc<dyn ConstantBuffer>>,
    skinned_blocks: Vec<Arc<dyn ConstantBuffer>>,
}

fn create_block(
    device: &mut dyn GraphicsDevice,
    size: usize,
    label: &'static str,
) -> Result<Arc<dyn ConstantBuffer>> {
    device.create_constant_buffer(&BufferDesc {
        size: size as u64,
        usage: BufferUsage::Dynamic,
        label,
    })
}

/// Block `index` of an instance pool, creating it when the pool is exhausted
fn pooled_block(
    pool: &mut Vec<Arc<dyn ConstantBuffer>>,
    index: usize,
    device: &mut dyn GraphicsDevice,
    size: usize,
    label: &'static str,
) -> Result<Arc<dyn ConstantBuffer>> {
    if let Some(block) = pool.get(index) {
        return Ok(block.clone());
    }
    let block = create_block(device, size, label)?;
    pool.push(block.clone());
    Ok(block)
}

// ===== STAGE =====

/// Owner of every constant block the passes bind
pub struct ConstantDataStage {
    sets: Vec<BufferSet>,
    set_index: usize,

    // Instance block assignment of the current frame
    object_blocks: Vec<Option<Arc<dyn ConstantBuffer>>>,
    sub_mesh_blocks: Vec<Option<Arc<dyn ConstantBuffer>>>,
    static_attempted: BitSet,
}

impl ConstantDataStage {
    /// Create a stage rotating through `set_count` buffer sets (at least one)
    pub fn new(set_count: usize) -> Self {
        Self {
            sets: (0..set_count.max(1)).map(|_| BufferSet::default()).collect(),
            set_index: 0,
            object_blocks: Vec::new(),
            sub_mesh_blocks: Vec::new(),
            static_attempted: BitSet::new(),
        }
    }

    pub fn set_count(&self) -> usize {
        self.sets.len()
    }

    /// Buffer set written by the last `swap_and_populate()`
    pub fn set_index(&self) -> usize {
        self.set_index
    }

    /// Advance to the next buffer set and rewrite all of its blocks.
    ///
    /// Creation and upload failures are logged; the affected blocks read as
    /// absent for this frame so their draws get skipped.
    pub fn swap_and_populate(
        &mut self,
        device: &mut dyn GraphicsDevice,
        views: &ViewPool,
        objects: &ObjectPool,
        sub_meshes: &SubMeshPool,
        inputs: &FrameInputs,
    ) -> ConstantDataStats {
        self.set_index = (self.set_index + 1) % self.sets.len();
        let mut stats = ConstantDataStats::default();

        let set = &mut self.sets[self.set_index];
        populate_views(set, device, views, inputs, &mut stats);

        self.object_blocks.clear();
        self.object_blocks.resize(objects.capacity(), None);
        self.sub_mesh_blocks.clear();
        self.sub_mesh_blocks.resize(sub_meshes.capacity(), None);
        self.static_attempted.resize(objects.capacity());
        self.static_attempted.clear_all();

        let mut static_used = 0;
        let mut skinned_used = 0;
        for (sub_mesh_id, sub_mesh) in sub_meshes.iter() {
            let object_id = sub_mesh.object();
            let Some(object) = objects.get(object_id) else {
                continue;
            };
            let object_index = object_id.index() as usize;

            if let (RenderKind::Skinned, Some(map)) =
                (object.render_kind(), sub_mesh.skinning_palette_map())
            {
                let data = skinned_instance_data(object, map);
                let block = pooled_block(
                    &mut set.skinned_blocks,
                    skinned_used,
                    device,
                    size_of::<InstanceData>() * BONE_COUNT_MAX,
                    SKINNED_INSTANCE_LABEL,
                );
                if let Some(block) = upload_instance(block, bytemuck::cast_slice(&data[..]), &mut stats) {
                    skinned_used += 1;
                    stats.skinned_blocks += 1;
                    self.sub_mesh_blocks[sub_mesh_id.index() as usize] = Some(block);
                }
                continue;
            }

            if self.static_attempted.get(object_index) {
                continue;
            }
            self.static_attempted.set(object_index);

            let data = InstanceData::from_matrix(object.transform());
            let block = pooled_block(
                &mut set.static_blocks,
                static_used,
                device,
                size_of::<InstanceData>(),
                STATIC_INSTANCE_LABEL,
            );
            if let Some(block) = upload_instance(block, bytemuck::bytes_of(&data), &mut stats) {
                static_used += 1;
                stats.static_blocks += 1;
                self.object_blocks[object_index] = Some(block);
            }
        }

        stats
    }

    pub fn view_global_block(&self, view: ViewId) -> Option<&Arc<dyn ConstantBuffer>> {
        self.view_blocks(view).and_then(|blocks| blocks.global.get())
    }

    pub fn base_pass_vertex_block(&self, view: ViewId) -> Option<&Arc<dyn ConstantBuffer>> {
        self.view_blocks(view).and_then(|blocks| blocks.base_pass_vertex.get())
    }

    pub fn base_pass_pixel_block(&self, view: ViewId) -> Option<&Arc<dyn ConstantBuffer>> {
        self.view_blocks(view).and_then(|blocks| blocks.base_pass_pixel.get())
    }

    /// Shadow view block; absent when shadows are disabled
    pub fn shadow_view_block(&self, view: ViewId) -> Option<&Arc<dyn ConstantBuffer>> {
        self.view_blocks(view).and_then(|blocks| blocks.shadow_view.get())
    }

    /// Instance block of a sub-mesh: its own skinned block if it has one,
    /// otherwise its object's static block
    pub fn instance_block(
        &self,
        sub_mesh: SubMeshId,
        object: ObjectId,
    ) -> Option<(&Arc<dyn ConstantBuffer>, RenderKind)> {
        if let Some(Some(block)) = self.sub_mesh_blocks.get(sub_mesh.index() as usize) {
            return Some((block, RenderKind::Skinned));
        }
        match self.object_blocks.get(object.index() as usize) {
            Some(Some(block)) => Some((block, RenderKind::Static)),
            _ => None,
        }
    }

    fn view_blocks(&self, view: ViewId) -> Option<&ViewBlocks> {
        self.sets[self.set_index].views.get(view.index() as usize)
    }
}

fn populate_views(
    set: &mut BufferSet,
    device: &mut dyn GraphicsDevice,
    views: &ViewPool,
    inputs: &FrameInputs,
    stats: &mut ConstantDataStats,
) {
    if set.views.len() < views.capacity() {
        set.views.resize_with(views.capacity(), ViewBlocks::default);
    }
    set.views.iter_mut().for_each(ViewBlocks::invalidate);

    let lighting = inputs.lighting;
    let pixel_data = BasePassPixelData {
        ambient_top: lighting.ambient_top_radiance().to_array(),
        ambient_bottom: lighting.ambient_bottom_radiance().to_array(),
        directional_light: lighting.directional_radiance().to_array(),
        inverse_shadow_map_size: inputs.inverse_shadow_map_size.extend(0.0).extend(0.0).to_array(),
    };

    for (view_id, view) in views.iter() {
        let index = view_id.index() as usize;
        let blocks = &mut set.views[index];
        let shadow_view_projection = inputs
            .shadow_view_projections
            .get(index)
            .copied()
            .unwrap_or(Mat4::IDENTITY);

        let global = ViewGlobalData {
            view_projection: matrix_rows(view.view_projection_matrix()),
            view: matrix_rows(view.view_matrix()),
        };
        let light_direction = view
            .view_matrix()
            .transform_vector3(-lighting.directional_direction());
        let viewport = view.viewport();
        let vertex_data = BasePassVertexData {
            shadow_texture_projection: matrix_rows(&(inputs.shadow_uv_transform * shadow_view_projection)),
            light_direction: light_direction.extend(0.0).to_array(),
            viewport_half_size: [viewport.width as f32 * 0.5, viewport.height as f32 * 0.5, 0.0, 0.0],
        };

        let mut written = [
            blocks.global.write(device, VIEW_GLOBAL_LABEL, &global),
            blocks.base_pass_vertex.write(device, BASE_PASS_VERTEX_LABEL, &vertex_data),
            blocks.base_pass_pixel.write(device, BASE_PASS_PIXEL_LABEL, &pixel_data),
            true,
        ];
        if inputs.shadows_enabled {
            let shadow_data = ShadowViewData { view_projection: matrix_rows(&shadow_view_projection) };
            written[3] = blocks.shadow_view.write(device, SHADOW_VIEW_LABEL, &shadow_data);
        }
        stats.failures += written.iter().filter(|ok| !**ok).count() as u32;
    }
}

fn upload_instance(
    block: Result<Arc<dyn ConstantBuffer>>,
    data: &[u8],
    stats: &mut ConstantDataStats,
) -> Option<Arc<dyn ConstantBuffer>> {
    let result = block.and_then(|block| {
        block.upload(MapHint::Discard, data)?;
        Ok(block)
    });
    match result {
        Ok(block) => Some(block),
        Err(error) => {
            engine_error!("scene3d::ConstantData", "Instance block unavailable: {}", error);
            stats.failures += 1;
            None
        }
    }
}

/// Bone palette remapped through a sub-mesh's palette map.
///
/// Entries past the map are zero; map entries outside the palette get identity.
fn skinned_instance_data(object: &SceneObject, map: &[u8]) -> Vec<InstanceData> {
    let mut data = vec![InstanceData::zeroed(); BONE_COUNT_MAX];
    let palette = object.bone_palette().map(|palette| &palette[..]).unwrap_or(&[]);
    for (slot, &bone) in map.iter().take(BONE_COUNT_MAX).enumerate() {
        let matrix = palette.get(bone as usize).unwrap_or(&Mat4::IDENTITY);
        data[slot] = InstanceData::from_matrix(matrix);
    }
    data
}

#[cfg(test)]
#[path = "constant_data_tests.rs"]
mod tests;
