//! Immediate command submission interface

use std::sync::Arc;
use bitflags::bitflags;
use glam::Vec4;
use crate::error::Result;
use super::buffer::{Buffer, ConstantBuffer};
use super::shader::{Shader, VertexDescription};
use super::state::{BlendState, DepthStencilState, RasterizerState, SamplerState};
use super::texture::{Surface, Texture2d};

bitflags! {
    /// Targets affected by a clear
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClearFlags: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

/// Viewport rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Primitive topology of an indexed draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimitiveType {
    PointList,
    LineList,
    LineStrip,
    #[default]
    TriangleList,
    TriangleStrip,
}

/// Arguments of an indexed draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawIndexedArgs {
    pub primitive_type: PrimitiveType,
    /// Value added to every index before fetching vertices
    pub base_vertex: u32,
    /// Lowest vertex index referenced
    pub min_index: u32,
    /// Number of vertices referenced, starting at `min_index`
    pub vertex_count: u32,
    /// First index read from the index buffer
    pub start_index: u32,
    pub primitive_count: u32,
}

/// Command submission interface of the graphics device
///
/// Commands execute in submission order. Passing `None` for a shader,
/// state or texture unbinds that slot.
pub trait CommandList: Send + Sync {
    /// Begin a scene (one per view per frame)
    fn begin_scene(&mut self) -> Result<()>;

    /// End the current scene
    fn end_scene(&mut self) -> Result<()>;

    /// Bind color and depth-stencil surfaces
    fn set_render_surfaces(
        &mut self,
        color: Option<&Arc<dyn Surface>>,
        depth_stencil: Option<&Arc<dyn Surface>>,
    ) -> Result<()>;

    /// Set the viewport
    fn set_viewport(&mut self, viewport: Viewport) -> Result<()>;

    /// Clear the bound surfaces
    fn clear(&mut self, flags: ClearFlags, color: Vec4, depth: f32, stencil: u8) -> Result<()>;

    fn set_rasterizer_state(&mut self, state: Option<&Arc<dyn RasterizerState>>) -> Result<()>;

    fn set_blend_state(&mut self, state: Option<&Arc<dyn BlendState>>) -> Result<()>;

    fn set_depth_stencil_state(
        &mut self,
        state: Option<&Arc<dyn DepthStencilState>>,
        stencil_reference: u8,
    ) -> Result<()>;

    fn set_vertex_shader(&mut self, shader: Option<&Arc<dyn Shader>>) -> Result<()>;

    fn set_pixel_shader(&mut self, shader: Option<&Arc<dyn Shader>>) -> Result<()>;

    /// Bind constant buffers to consecutive vertex shader slots starting at `start_slot`
    fn set_vertex_constant_buffers(
        &mut self,
        start_slot: u32,
        buffers: &[Arc<dyn ConstantBuffer>],
    ) -> Result<()>;

    /// Bind constant buffers to consecutive pixel shader slots starting at `start_slot`
    fn set_pixel_constant_buffers(
        &mut self,
        start_slot: u32,
        buffers: &[Arc<dyn ConstantBuffer>],
    ) -> Result<()>;

    /// Bind a vertex buffer
    fn set_vertex_buffer(
        &mut self,
        slot: u32,
        buffer: &Arc<dyn Buffer>,
        stride: u32,
        offset: u32,
    ) -> Result<()>;

    /// Bind an index buffer
    fn set_index_buffer(&mut self, buffer: &Arc<dyn Buffer>) -> Result<()>;

    /// Bind the input layout matching the current vertex shader and `description`
    fn set_vertex_description(&mut self, description: &Arc<dyn VertexDescription>) -> Result<()>;

    fn set_sampler_state(&mut self, slot: u32, state: Option<&Arc<dyn SamplerState>>) -> Result<()>;

    fn set_texture(&mut self, slot: u32, texture: Option<&Arc<dyn Texture2d>>) -> Result<()>;

    /// Issue an indexed draw with the current bindings
    fn draw_indexed(&mut self, args: DrawIndexedArgs) -> Result<()>;
}
