//! GraphicsScene: the pools of views, objects and sub-meshes, and the
//! per-frame update that renders every view.
//!
//! Handles stay valid until released. Released slots are reused by the next
//! allocation, lowest index first, so a stale handle may alias a newer
//! element. Mutators taking an invalid handle do nothing and return false.

use glam::{Mat4, Vec2, Vec3};
use crate::camera::SceneView;
use crate::config::{GraphicsConfig, ShadowMode};
use crate::device::{DeviceStatus, GraphicsDevice};
use crate::resource::RenderResources;
use crate::{engine_debug, engine_info, engine_warn};
use super::constant_data::{ConstantDataStage, FrameInputs};
use super::lighting::SceneLighting;
use super::pass_sequencer::{FrameStats, PassContext, PassSequencer};
use super::pool::{ObjectId, PoolHandle, SubMeshId, ViewId};
use super::scene_object::SceneObject;
use super::shadow_fit::{compute_shadow_frustum, shadow_uv_transform};
use super::sub_mesh::SubMeshData;
use super::visibility::VisibilityStage;
use super::{ObjectPool, SubMeshPool, ViewPool};

/// A renderable scene and its frame pipeline
pub struct GraphicsScene {
    config: GraphicsConfig,
    views: ViewPool,
    objects: ObjectPool,
    sub_meshes: SubMeshPool,
    lighting: SceneLighting,
    /// View used by picking and editor tools; rendering draws every view
    active_view: Option<ViewId>,
    visibility: VisibilityStage,
    constants: ConstantDataStage,
    sequencer: PassSequencer,
    /// Light view-projection per view slot, rebuilt each frame
    shadow_view_projections: Vec<Mat4>,
    last_frame_stats: FrameStats,
}

impl GraphicsScene {
    pub fn new(config: GraphicsConfig) -> Self {
        let set_count = config.effective_buffer_set_count();
        engine_info!("scene3d::GraphicsScene",
            "Graphics scene created ({} buffer sets, shadows {:?} at {}px)",
            set_count, config.shadow_mode, config.shadow_buffer_size);

        Self {
            views: ViewPool::new(),
            objects: ObjectPool::new(),
            sub_meshes: SubMeshPool::new(),
            lighting: SceneLighting::default(),
            active_view: None,
            visibility: VisibilityStage::new(),
            constants: ConstantDataStage::new(set_count),
            sequencer: PassSequencer::new(),
            shadow_view_projections: Vec::new(),
            last_frame_stats: FrameStats::default(),
            config,
        }
    }

    pub fn config(&self) -> &GraphicsConfig {
        &self.config
    }

    // ===== VIEWS =====

    /// Allocate a view with default camera parameters
    pub fn allocate_view(&mut self) -> ViewId {
        self.views.allocate()
    }

    /// Release a view. Returns false if the handle is invalid.
    pub fn release_view(&mut self, id: ViewId) -> bool {
        if self.views.release(id).is_none() {
            return false;
        }
        if self.active_view == Some(id) {
            self.active_view = None;
        }
        true
    }

    pub fn view(&self, id: ViewId) -> Option<&SceneView> {
        self.views.get(id)
    }

    pub fn view_mut(&mut self, id: ViewId) -> Option<&mut SceneView> {
        self.views.get_mut(id)
    }

    pub fn views(&self) -> &ViewPool {
        &self.views
    }

    /// Set the camera of a view. Returns false if the handle is invalid.
    pub fn set_view_transform(&mut self, id: ViewId, origin: Vec3, forward: Vec3, up: Vec3) -> bool {
        self.with_view(id, |view| view.set_view(origin, forward, up))
    }

    /// Set the viewport of a view. Returns false if the handle is invalid.
    pub fn set_view_viewport(&mut self, id: ViewId, x: u32, y: u32, width: u32, height: u32) -> bool {
        self.with_view(id, |view| view.set_viewport(x, y, width, height))
    }

    /// Select the view used by tools. `None` or an invalid handle clears it.
    pub fn set_active_view(&mut self, id: Option<ViewId>) {
        self.active_view = id.filter(|&id| self.views.is_valid(id));
    }

    pub fn active_view(&self) -> Option<ViewId> {
        self.active_view
    }

    fn with_view(&mut self, id: ViewId, f: impl FnOnce(&mut SceneView)) -> bool {
        match self.views.get_mut(id) {
            Some(view) => {
                f(view);
                true
            }
            None => false,
        }
    }

    // ===== OBJECTS =====

    /// Allocate an object with an identity transform and no geometry
    pub fn allocate_object(&mut self) -> ObjectId {
        self.objects.allocate()
    }

    /// Release an object together with all of its sub-meshes.
    /// Returns false if the handle is invalid.
    pub fn release_object(&mut self, id: ObjectId) -> bool {
        if self.objects.release(id).is_none() {
            return false;
        }

        let owned: Vec<SubMeshId> = self.sub_meshes
            .iter()
            .filter(|(_, sub_mesh)| sub_mesh.object() == id)
            .map(|(handle, _)| handle)
            .collect();
        for handle in owned {
            self.sub_meshes.release(handle);
        }
        true
    }

    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(id)
    }

    pub fn objects(&self) -> &ObjectPool {
        &self.objects
    }

    // ===== SUB-MESHES =====

    /// Allocate a sub-mesh owned by `object`. Returns `None` if the object is invalid.
    pub fn allocate_sub_mesh(&mut self, object: ObjectId) -> Option<SubMeshId> {
        if !self.objects.is_valid(object) {
            engine_warn!("scene3d::GraphicsScene",
                "Sub-mesh allocation for invalid object {}", object.index());
            return None;
        }
        Some(self.sub_meshes.insert(SubMeshData::new(object)))
    }

    /// Release a sub-mesh. Returns false if the handle is invalid.
    pub fn release_sub_mesh(&mut self, id: SubMeshId) -> bool {
        self.sub_meshes.release(id).is_some()
    }

    pub fn sub_mesh(&self, id: SubMeshId) -> Option<&SubMeshData> {
        self.sub_meshes.get(id)
    }

    pub fn sub_mesh_mut(&mut self, id: SubMeshId) -> Option<&mut SubMeshData> {
        self.sub_meshes.get_mut(id)
    }

    pub fn sub_meshes(&self) -> &SubMeshPool {
        &self.sub_meshes
    }

    // ===== LIGHTING =====

    pub fn set_ambient_light(
        &mut self,
        top_color: Vec3,
        top_brightness: f32,
        bottom_color: Vec3,
        bottom_brightness: f32,
    ) {
        self.lighting.set_ambient(top_color, top_brightness, bottom_color, bottom_brightness);
    }

    /// Set the directional light. A zero direction keeps the previous one.
    pub fn set_directional_light(&mut self, direction: Vec3, color: Vec3, brightness: f32) {
        self.lighting.set_directional(direction, color, brightness);
    }

    pub fn lighting(&self) -> &SceneLighting {
        &self.lighting
    }

    // ===== FRAME =====

    /// Statistics of the last `update()`
    pub fn last_frame_stats(&self) -> &FrameStats {
        &self.last_frame_stats
    }

    /// Light view-projection computed for a view during the last frame
    pub fn shadow_view_projection(&self, id: ViewId) -> Option<Mat4> {
        if !self.views.is_valid(id) {
            return None;
        }
        self.shadow_view_projections.get(id.index() as usize).copied()
    }

    /// Render one frame of every view.
    ///
    /// Skips the frame if the device is lost, or resets it first when it is
    /// resettable. Failures inside the frame are logged and never abort it.
    pub fn update(&mut self, device: &mut dyn GraphicsDevice, resources: &dyn RenderResources) {
        let mut stats = FrameStats::default();
        self.last_frame_stats = stats;

        match device.status() {
            DeviceStatus::Ready => {}
            DeviceStatus::Lost => {
                engine_debug!("scene3d::GraphicsScene", "Device lost, frame skipped");
                return;
            }
            DeviceStatus::NotReset => {
                let status = device.reset();
                if status != DeviceStatus::Ready {
                    engine_warn!("scene3d::GraphicsScene",
                        "Device reset failed ({:?}), frame skipped", status);
                    return;
                }
                engine_info!("scene3d::GraphicsScene", "Device reset");
            }
        }

        let Some(scene_texture) = resources.scene_texture() else {
            engine_warn!("scene3d::GraphicsScene", "No scene texture, frame skipped");
            return;
        };
        if self.views.is_empty() {
            return;
        }

        for (_, view) in self.views.iter_mut() {
            view.conditional_update();
        }

        let shadow_texture = resources.shadow_depth_texture();
        let shadows_enabled = self.config.shadows_enabled() && shadow_texture.is_some();
        let shadow_mode = if shadows_enabled { self.config.shadow_mode } else { ShadowMode::None };
        let light_direction = self.lighting.directional_direction();

        self.shadow_view_projections.clear();
        self.shadow_view_projections.resize(self.views.capacity(), Mat4::IDENTITY);
        if shadows_enabled {
            for (id, view) in self.views.iter() {
                self.shadow_view_projections[id.index() as usize] =
                    compute_shadow_frustum(view, light_direction, self.config.shadow_fit);
            }
        }

        let texture_size = shadow_texture.as_ref().map(|texture| (texture.width(), texture.height()));
        let inverse_shadow_map_size = texture_size
            .map(|(width, height)| Vec2::new(1.0 / width.max(1) as f32, 1.0 / height.max(1) as f32))
            .unwrap_or(Vec2::ONE);
        let inputs = FrameInputs {
            lighting: &self.lighting,
            shadow_view_projections: &self.shadow_view_projections,
            shadows_enabled,
            shadow_uv_transform: shadow_uv_transform(resources.shadow_depth_usable_size(), texture_size),
            inverse_shadow_map_size,
        };
        stats.constant_data = self.constants.swap_and_populate(
            device, &self.views, &self.objects, &self.sub_meshes, &inputs);

        for (view_id, view) in self.views.iter() {
            // A view without a depth surface is still drawn
            if view.render_context().is_none() {
                engine_debug!("scene3d::GraphicsScene",
                    "View {} has no render context, skipped", view_id.index());
                stats.views_skipped += 1;
                continue;
            }

            let visible = self.visibility.compute_visibility(view.frustum(), &self.objects, &self.sub_meshes);
            let ctx = PassContext {
                view_id,
                view,
                objects: &self.objects,
                sub_meshes: &self.sub_meshes,
                constants: &self.constants,
                resources,
                scene_texture: &scene_texture,
                shadow_mode,
                light_direction,
            };
            if self.sequencer.draw_view(&ctx, visible, device, &mut stats) {
                stats.views_drawn += 1;
                stats.visible_sub_meshes += visible.len() as u32;
            } else {
                stats.views_skipped += 1;
            }
        }

        self.last_frame_stats = stats;
    }
}

#[cfg(test)]
#[path = "graphics_scene_tests.rs"]
mod tests;
