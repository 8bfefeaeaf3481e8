//! Scene module
//!
//! Pools of views, objects and sub-meshes, and the frame pipeline that turns
//! them into device commands: visibility, shadow fitting, constant data,
//! sorting and the per-view pass sequence.

mod constant_data;
mod graphics_scene;
mod lighting;
mod pass_sequencer;
mod pool;
mod scene_object;
mod shadow_fit;
mod sorting;
mod sub_mesh;
mod visibility;

use crate::camera::SceneView;

pub use constant_data::{
    BasePassPixelData, BasePassVertexData, ConstantDataStage, ConstantDataStats, FrameInputs,
    InstanceData, ShadowViewData, ViewGlobalData, BONE_COUNT_MAX,
};
pub use graphics_scene::GraphicsScene;
pub use lighting::SceneLighting;
pub use pass_sequencer::{
    FrameStats, PassContext, PassSequencer, PassStats, RenderPassStage,
    DEFAULT_SAMPLER_NAME, SHADOW_MAP_TEXTURE_NAME, SHADOW_SAMPLER_NAME,
};
pub use pool::{ObjectId, PoolHandle, SparsePool, SubMeshId, ViewId};
pub use scene_object::{RenderKind, SceneObject};
pub use shadow_fit::{
    compute_shadow_frustum, shadow_uv_transform, DEFAULT_LIGHT_DIRECTION, SHADOW_DEPTH_OFFSET,
    SHADOW_DEPTH_RANGE,
};
pub use sorting::{order_preserving_bits, sort_by_material, sort_front_to_back};
pub use sub_mesh::SubMeshData;
pub use visibility::{sphere_visible, VisibilityStage};

/// Pool of scene views
pub type ViewPool = SparsePool<ViewId, SceneView>;
/// Pool of scene objects
pub type ObjectPool = SparsePool<ObjectId, SceneObject>;
/// Pool of sub-meshes
pub type SubMeshPool = SparsePool<SubMeshId, SubMeshData>;
