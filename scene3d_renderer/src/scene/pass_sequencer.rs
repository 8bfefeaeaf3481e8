//! Render pass sequencing for one view.
//!
//! Every view runs the same fixed sequence each frame:
//! ShadowDepth, DepthPrePass, BasePass, Composite. A pass whose inputs are
//! missing draws nothing, but the sequence still moves on to the next pass.

use std::slice;
use std::sync::Arc;
use glam::{Vec2, Vec3, Vec4};
use crate::camera::SceneView;
use crate::config::ShadowMode;
use crate::device::{
    BlendStateKind, Buffer, ClearFlags, CommandList, ConstantBuffer, DepthStencilStateKind,
    GraphicsDevice, RasterizerStateKind, ScreenVertex, Texture2d, TextureAddressMode,
    TextureFilter, VertexDescription, Viewport,
};
use crate::error::Result;
use crate::resource::{Material, RenderResources, ShaderOptionSet, ShaderVariant, SkinningOption};
use crate::{engine_debug, engine_error};
use super::constant_data::{ConstantDataStage, ConstantDataStats};
use super::pool::{PoolHandle, SubMeshId, ViewId};
use super::scene_object::{RenderKind, SceneObject};
use super::sorting::{sort_by_material, sort_front_to_back};
use super::sub_mesh::SubMeshData;
use super::{ObjectPool, SubMeshPool};

/// Sampler input bound to the default linear/wrap sampler
pub const DEFAULT_SAMPLER_NAME: &str = "DefaultSamplerState";
/// Sampler input bound to the shadow map sampler
pub const SHADOW_SAMPLER_NAME: &str = "ShadowSamplerState";
/// Texture input bound to the shadow depth texture
pub const SHADOW_MAP_TEXTURE_NAME: &str = "_ShadowMap";

// ===== STAGES =====

/// Position in the per-view pass sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderPassStage {
    ShadowDepth,
    DepthPrePass,
    BasePass,
    Composite,
}

impl RenderPassStage {
    /// All stages in execution order
    pub const ALL: [RenderPassStage; 4] = [
        RenderPassStage::ShadowDepth,
        RenderPassStage::DepthPrePass,
        RenderPassStage::BasePass,
        RenderPassStage::Composite,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Following stage, `None` after Composite
    pub fn next(self) -> Option<RenderPassStage> {
        match self {
            RenderPassStage::ShadowDepth => Some(RenderPassStage::DepthPrePass),
            RenderPassStage::DepthPrePass => Some(RenderPassStage::BasePass),
            RenderPassStage::BasePass => Some(RenderPassStage::Composite),
            RenderPassStage::Composite => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RenderPassStage::ShadowDepth => "ShadowDepth",
            RenderPassStage::DepthPrePass => "DepthPrePass",
            RenderPassStage::BasePass => "BasePass",
            RenderPassStage::Composite => "Composite",
        }
    }
}

// ===== STATISTICS =====

/// What one pass did, summed over all views of a frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Number of views for which the pass ran
    pub executions: u32,
    pub draw_calls: u32,
    /// Visible sub-meshes the pass could not draw
    pub skipped_sub_meshes: u32,
}

impl PassStats {
    fn executed() -> Self {
        Self { executions: 1, ..Default::default() }
    }

    fn accumulate(&mut self, other: PassStats) {
        self.executions += other.executions;
        self.draw_calls += other.draw_calls;
        self.skipped_sub_meshes += other.skipped_sub_meshes;
    }
}

/// Statistics of the last `GraphicsScene::update()`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub views_drawn: u32,
    pub views_skipped: u32,
    /// Visible sub-meshes summed over all drawn views
    pub visible_sub_meshes: u32,
    pub passes: [PassStats; 4],
    pub constant_data: ConstantDataStats,
}

impl FrameStats {
    pub fn pass(&self, stage: RenderPassStage) -> &PassStats {
        &self.passes[stage.index()]
    }

    pub fn draw_calls(&self, stage: RenderPassStage) -> u32 {
        self.pass(stage).draw_calls
    }

    pub fn total_draw_calls(&self) -> u32 {
        self.passes.iter().map(|pass| pass.draw_calls).sum()
    }
}

// ===== CONTEXT =====

/// Everything a view's passes read
pub struct PassContext<'a> {
    pub view_id: ViewId,
    pub view: &'a SceneView,
    pub objects: &'a ObjectPool,
    pub sub_meshes: &'a SubMeshPool,
    pub constants: &'a ConstantDataStage,
    pub resources: &'a dyn RenderResources,
    pub scene_texture: &'a Arc<dyn Texture2d>,
    /// Shadow mode in effect this frame (`None` when shadows are disabled)
    pub shadow_mode: ShadowMode,
    /// Unit direction the directional light travels in
    pub light_direction: Vec3,
}

/// Resolved inputs of one sub-mesh draw
struct DrawItem<'a> {
    sub_mesh: &'a SubMeshData,
    object: &'a SceneObject,
    instance_block: &'a Arc<dyn ConstantBuffer>,
    kind: RenderKind,
    vertex_buffer: &'a Arc<dyn Buffer>,
    index_buffer: &'a Arc<dyn Buffer>,
    vertex_description: &'a Arc<dyn VertexDescription>,
}

/// Look up everything needed to draw a sub-mesh; `None` if anything is missing
fn resolve_draw<'a>(ctx: &PassContext<'a>, id: SubMeshId) -> Option<DrawItem<'a>> {
    let sub_mesh = ctx.sub_meshes.get(id)?;
    let object = ctx.objects.get(sub_mesh.object())?;
    let (instance_block, kind) = ctx.constants.instance_block(id, sub_mesh.object())?;
    Some(DrawItem {
        sub_mesh,
        object,
        instance_block,
        kind,
        vertex_buffer: object.vertex_buffer()?,
        index_buffer: object.index_buffer()?,
        vertex_description: object.vertex_description()?,
    })
}

fn skinning_option(kind: RenderKind) -> SkinningOption {
    match kind {
        RenderKind::Static => SkinningOption::None,
        RenderKind::Skinned => SkinningOption::Smooth,
    }
}

/// Bind the instance block and geometry of a draw, then issue it
fn submit_draw(commands: &mut dyn CommandList, draw: &DrawItem, instance_slot: u32) -> Result<()> {
    commands.set_vertex_constant_buffers(instance_slot, slice::from_ref(draw.instance_block))?;
    commands.set_vertex_buffer(0, draw.vertex_buffer, draw.object.vertex_stride(), 0)?;
    commands.set_index_buffer(draw.index_buffer)?;
    commands.set_vertex_description(draw.vertex_description)?;
    commands.draw_indexed(draw.sub_mesh.draw_args())
}

// ===== SEQUENCER =====

/// Drives the pass sequence of each view
#[derive(Debug, Default)]
pub struct PassSequencer {
    visited: Vec<RenderPassStage>,
    draw_order: Vec<SubMeshId>,
}

impl PassSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages entered while drawing the last view, in order
    pub fn visited_stages(&self) -> &[RenderPassStage] {
        &self.visited
    }

    /// Run all passes of one view over its visible sub-meshes.
    ///
    /// Pass failures are logged and end that pass only. Returns false if the
    /// view could not be drawn at all (no view global block).
    pub fn draw_view(
        &mut self,
        ctx: &PassContext,
        visible: &[SubMeshId],
        device: &mut dyn GraphicsDevice,
        stats: &mut FrameStats,
    ) -> bool {
        self.visited.clear();
        let Some(global_block) = ctx.constants.view_global_block(ctx.view_id) else {
            engine_debug!("scene3d::PassSequencer",
                "View {} has no global constant block, skipped", ctx.view_id.index());
            return false;
        };

        let default_depth = ctx.resources.depth_stencil_state(DepthStencilStateKind::Default);
        if let Err(error) = device.command_list().set_depth_stencil_state(default_depth.as_ref(), 0) {
            engine_error!("scene3d::PassSequencer", "Failed to set default depth state: {}", error);
        }

        let mut scene_open = false;
        let mut stage = Some(RenderPassStage::ShadowDepth);
        while let Some(current) = stage {
            self.visited.push(current);
            let result = match current {
                RenderPassStage::ShadowDepth => {
                    shadow_depth_pass(ctx, &mut self.draw_order, visible, device.command_list())
                }
                RenderPassStage::DepthPrePass => {
                    let commands = device.command_list();
                    match begin_view_scene(ctx, global_block, commands, &mut scene_open) {
                        Ok(()) => depth_pre_pass(ctx, &mut self.draw_order, visible, commands),
                        Err(error) => Err(error),
                    }
                }
                RenderPassStage::BasePass => {
                    let commands = device.command_list();
                    if scene_open {
                        let result = base_pass(ctx, &mut self.draw_order, visible, commands);
                        let ended = commands.end_scene();
                        result.and_then(|pass| ended.map(|()| pass))
                    } else {
                        Ok(PassStats::default())
                    }
                }
                RenderPassStage::Composite => composite_pass(ctx, device),
            };

            match result {
                Ok(pass) => stats.passes[current.index()].accumulate(pass),
                Err(error) => {
                    engine_error!("scene3d::PassSequencer",
                        "{} pass failed for view {}: {}", current.name(), ctx.view_id.index(), error);
                }
            }
            stage = current.next();
        }

        true
    }
}

// ===== PASSES =====

fn shadow_depth_pass(
    ctx: &PassContext,
    order: &mut Vec<SubMeshId>,
    visible: &[SubMeshId],
    commands: &mut dyn CommandList,
) -> Result<PassStats> {
    if !ctx.shadow_mode.is_enabled() {
        return Ok(PassStats::default());
    }
    let Some(shadow_block) = ctx.constants.shadow_view_block(ctx.view_id) else {
        return Ok(PassStats::default());
    };
    let Some(shadow_surface) = ctx.resources.shadow_depth_texture().and_then(|texture| texture.surface()) else {
        engine_debug!("scene3d::PassSequencer", "No shadow depth surface, shadow pass skipped");
        return Ok(PassStats::default());
    };
    let Some(pre_pass) = ctx.resources.pre_pass_vertex_shader() else {
        engine_debug!("scene3d::PassSequencer", "No pre-pass vertex shader, shadow pass skipped");
        return Ok(PassStats::default());
    };

    order.clear();
    order.extend_from_slice(visible);
    sort_front_to_back(order, ctx.light_direction, ctx.sub_meshes, ctx.objects);

    let usable_size = ctx.resources.shadow_depth_usable_size();
    let scene_surface = ctx.scene_texture.surface();
    commands.set_render_surfaces(scene_surface.as_ref(), Some(&shadow_surface))?;
    commands.set_viewport(Viewport { x: 0, y: 0, width: usable_size, height: usable_size })?;
    commands.set_rasterizer_state(ctx.resources.rasterizer_state(RasterizerStateKind::ShadowDepth).as_ref())?;
    commands.set_blend_state(ctx.resources.blend_state(BlendStateKind::NoColor).as_ref())?;

    commands.begin_scene()?;
    let result = shadow_depth_draws(ctx, order, shadow_block, &pre_pass, commands);
    let ended = commands.end_scene();
    result.and_then(|pass| ended.map(|()| pass))
}

fn shadow_depth_draws(
    ctx: &PassContext,
    order: &[SubMeshId],
    shadow_block: &Arc<dyn ConstantBuffer>,
    pre_pass: &ShaderVariant,
    commands: &mut dyn CommandList,
) -> Result<PassStats> {
    commands.clear(ClearFlags::DEPTH, Vec4::ZERO, 1.0, 0)?;
    commands.set_vertex_constant_buffers(0, slice::from_ref(shadow_block))?;
    commands.set_pixel_shader(None)?;
    depth_only_draws(ctx, order, pre_pass, commands)
}

/// Bind the scene target and the view-wide state shared by the depth and base passes.
///
/// `scene_open` is set once the scene has begun, so it gets ended even if a later step fails.
fn begin_view_scene(
    ctx: &PassContext,
    global_block: &Arc<dyn ConstantBuffer>,
    commands: &mut dyn CommandList,
    scene_open: &mut bool,
) -> Result<()> {
    let scene_surface = ctx.scene_texture.surface();
    commands.set_render_surfaces(scene_surface.as_ref(), ctx.view.depth_stencil_surface())?;
    commands.set_viewport(ctx.view.viewport())?;
    commands.begin_scene()?;
    *scene_open = true;
    commands.clear(ClearFlags::all(), ctx.view.clear_color(), 1.0, 0)?;
    commands.set_rasterizer_state(ctx.resources.rasterizer_state(RasterizerStateKind::Default).as_ref())?;
    commands.set_vertex_constant_buffers(0, slice::from_ref(global_block))
}

fn depth_pre_pass(
    ctx: &PassContext,
    order: &mut Vec<SubMeshId>,
    visible: &[SubMeshId],
    commands: &mut dyn CommandList,
) -> Result<PassStats> {
    let Some(pre_pass) = ctx.resources.pre_pass_vertex_shader() else {
        return Ok(PassStats::default());
    };

    order.clear();
    order.extend_from_slice(visible);
    sort_front_to_back(order, ctx.view.forward(), ctx.sub_meshes, ctx.objects);

    commands.set_blend_state(ctx.resources.blend_state(BlendStateKind::NoColor).as_ref())?;
    commands.set_pixel_shader(None)?;
    depth_only_draws(ctx, order, &pre_pass, commands)
}

/// Draw loop shared by the shadow depth and depth pre-passes
fn depth_only_draws(
    ctx: &PassContext,
    order: &[SubMeshId],
    pre_pass: &ShaderVariant,
    commands: &mut dyn CommandList,
) -> Result<PassStats> {
    let mut stats = PassStats::executed();
    let mut bound_kind = None;

    for &id in order {
        let Some(draw) = resolve_draw(ctx, id) else {
            stats.skipped_sub_meshes += 1;
            continue;
        };
        let options = ShaderOptionSet::new(skinning_option(draw.kind), ShadowMode::None);
        let Some(shader) = pre_pass.shader(&options) else {
            stats.skipped_sub_meshes += 1;
            continue;
        };

        if bound_kind != Some(draw.kind) {
            commands.set_vertex_shader(Some(shader))?;
            bound_kind = Some(draw.kind);
        }
        submit_draw(commands, &draw, 1)?;
        stats.draw_calls += 1;
    }

    Ok(stats)
}

fn base_pass(
    ctx: &PassContext,
    order: &mut Vec<SubMeshId>,
    visible: &[SubMeshId],
    commands: &mut dyn CommandList,
) -> Result<PassStats> {
    let (Some(vertex_block), Some(pixel_block)) = (
        ctx.constants.base_pass_vertex_block(ctx.view_id),
        ctx.constants.base_pass_pixel_block(ctx.view_id),
    ) else {
        return Ok(PassStats::default());
    };

    order.clear();
    order.extend_from_slice(visible);
    sort_by_material(order, ctx.sub_meshes);

    commands.set_blend_state(ctx.resources.blend_state(BlendStateKind::Opaque).as_ref())?;
    commands.set_vertex_constant_buffers(1, slice::from_ref(vertex_block))?;
    commands.set_pixel_constant_buffers(0, slice::from_ref(pixel_block))?;

    let default_sampler = ctx.resources.sampler_state(TextureFilter::Linear, TextureAddressMode::Wrap);
    let shadow_sampler = ctx.resources.shadow_sampler_state();
    let shadow_texture = if ctx.shadow_mode.is_enabled() {
        ctx.resources.shadow_depth_texture()
    } else {
        None
    };

    let mut stats = PassStats::executed();
    let mut bound: Option<(&Arc<Material>, RenderKind)> = None;
    let mut bound_vertex_constants: Option<&Arc<dyn ConstantBuffer>> = None;
    let mut bound_pixel_constants: Option<&Arc<dyn ConstantBuffer>> = None;

    for &id in order.iter() {
        let Some(draw) = resolve_draw(ctx, id) else {
            stats.skipped_sub_meshes += 1;
            continue;
        };
        let Some(material) = draw.sub_mesh.material() else {
            stats.skipped_sub_meshes += 1;
            continue;
        };
        let (Some(vertex_variant), Some(pixel_variant)) =
            (material.vertex_variant(), material.pixel_variant())
        else {
            stats.skipped_sub_meshes += 1;
            continue;
        };
        let vertex_options = ShaderOptionSet::new(skinning_option(draw.kind), ctx.shadow_mode);
        let pixel_options = ShaderOptionSet::new(SkinningOption::None, ctx.shadow_mode);
        let (Some(vertex_shader), Some(pixel_shader)) =
            (vertex_variant.shader(&vertex_options), pixel_variant.shader(&pixel_options))
        else {
            stats.skipped_sub_meshes += 1;
            continue;
        };

        if let Some(constants) = material.vertex_constants() {
            if !same_buffer(bound_vertex_constants, constants) {
                commands.set_vertex_constant_buffers(3, slice::from_ref(constants))?;
                bound_vertex_constants = Some(constants);
            }
        }
        if let Some(constants) = material.pixel_constants() {
            if !same_buffer(bound_pixel_constants, constants) {
                commands.set_pixel_constant_buffers(1, slice::from_ref(constants))?;
                bound_pixel_constants = Some(constants);
            }
        }

        let unchanged = matches!(bound, Some((previous, kind)) if Arc::ptr_eq(previous, material) && kind == draw.kind);
        if !unchanged {
            commands.set_vertex_shader(Some(vertex_shader))?;
            commands.set_pixel_shader(Some(pixel_shader))?;

            for input in pixel_variant.sampler_inputs() {
                let sampler = match input.name.as_str() {
                    DEFAULT_SAMPLER_NAME => default_sampler.as_ref(),
                    SHADOW_SAMPLER_NAME | SHADOW_MAP_TEXTURE_NAME => shadow_sampler.as_ref(),
                    _ => None,
                };
                commands.set_sampler_state(input.bind_index, sampler)?;
            }
            for input in pixel_variant.texture_inputs() {
                let texture = if input.name == SHADOW_MAP_TEXTURE_NAME {
                    shadow_texture.as_ref()
                } else {
                    material.texture_by_name(&input.name)
                };
                commands.set_texture(input.bind_index, texture)?;
            }
            bound = Some((material, draw.kind));
        }

        submit_draw(commands, &draw, 2)?;
        stats.draw_calls += 1;
    }

    Ok(stats)
}

/// Whether `buffer` is the one currently bound
fn same_buffer(bound: Option<&Arc<dyn ConstantBuffer>>, buffer: &Arc<dyn ConstantBuffer>) -> bool {
    bound.is_some_and(|bound| Arc::as_ptr(bound) as *const u8 == Arc::as_ptr(buffer) as *const u8)
}

/// Copy the view's region of the scene texture to its render context
fn composite_pass(ctx: &PassContext, device: &mut dyn GraphicsDevice) -> Result<PassStats> {
    let Some(back_buffer) = ctx.view.render_context().and_then(|context| context.back_buffer_surface()) else {
        engine_debug!("scene3d::PassSequencer",
            "View {} has no back buffer, composite skipped", ctx.view_id.index());
        return Ok(PassStats::default());
    };

    let viewport = ctx.view.viewport();
    let commands = device.command_list();
    commands.set_render_surfaces(Some(&back_buffer), None)?;
    commands.set_viewport(viewport)?;
    commands.begin_scene()?;

    let result = composite_draw(ctx, viewport, device);
    let ended = device.command_list().end_scene();
    result.and_then(|pass| ended.map(|()| pass))
}

fn composite_draw(ctx: &PassContext, viewport: Viewport, device: &mut dyn GraphicsDevice) -> Result<PassStats> {
    let resources = ctx.resources;
    let commands = device.command_list();
    commands.set_rasterizer_state(resources.rasterizer_state(RasterizerStateKind::Default).as_ref())?;
    commands.set_blend_state(resources.blend_state(BlendStateKind::Opaque).as_ref())?;
    commands.set_depth_stencil_state(resources.depth_stencil_state(DepthStencilStateKind::None).as_ref(), 0)?;
    commands.set_sampler_state(
        0,
        resources.sampler_state(TextureFilter::Point, TextureAddressMode::Clamp).as_ref(),
    )?;

    let texture = ctx.scene_texture;
    let uv_extent = Vec2::new(
        viewport.width as f32 / texture.width().max(1) as f32,
        viewport.height as f32 / texture.height().max(1) as f32,
    );
    let quads = device.quad_drawer();
    quads.draw_screen_quad(full_screen_quad(uv_extent), texture)?;
    quads.flush()?;

    Ok(PassStats { executions: 1, draw_calls: 1, skipped_sub_meshes: 0 })
}

/// Clip-space quad as a triangle strip, sampling `[0, uv_extent]` of the texture
fn full_screen_quad(uv_extent: Vec2) -> [ScreenVertex; 4] {
    let vertex = |x: f32, y: f32, u: f32, v: f32| ScreenVertex {
        position: Vec3::new(x, y, 0.0),
        color: Vec4::ONE,
        tex_coords: Vec2::new(u, v),
    };
    [
        vertex(-1.0, -1.0, 0.0, uv_extent.y),
        vertex(-1.0, 1.0, 0.0, 0.0),
        vertex(1.0, 1.0, uv_extent.x, 0.0),
        vertex(1.0, -1.0, uv_extent.x, uv_extent.y),
    ]
}

#[cfg(test)]
#[path = "pass_sequencer_tests.rs"]
mod tests;
