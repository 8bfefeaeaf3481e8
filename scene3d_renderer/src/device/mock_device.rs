//! Mock graphics device for unit tests (no GPU required)
//!
//! Records every command as a string and counts constant buffer uploads per
//! label, so tests can assert on what a frame submitted.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use glam::Vec4;
use crate::config::ShadowMode;
use crate::device::{
    BlendState, BlendStateKind, Buffer, BufferDesc, ClearFlags, CommandList, ConstantBuffer,
    DepthStencilState, DepthStencilStateKind, DeviceStatus, DrawIndexedArgs, GraphicsDevice,
    MapHint, QuadDrawer, RasterizerState, RasterizerStateKind, RenderContext, SamplerState,
    ScreenVertex, Shader, Surface, Texture2d, TextureAddressMode, TextureFilter,
    VertexDescription, Viewport,
};
use crate::engine_bail;
use crate::error::{Error, Result};
use crate::resource::{RenderResources, ShaderOptionSet, ShaderVariant, ShaderVariantDesc, SkinningOption};

// ============================================================================
// Mock leaf resources
// ============================================================================

#[derive(Debug)]
pub struct MockShader {
    pub name: String,
}

impl MockShader {
    pub fn new(name: &str) -> Arc<dyn Shader> {
        Arc::new(Self { name: name.to_string() })
    }
}

impl Shader for MockShader {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug)]
pub struct MockBuffer;

impl MockBuffer {
    pub fn new() -> Arc<dyn Buffer> {
        Arc::new(Self)
    }
}

impl Buffer for MockBuffer {}

#[derive(Debug)]
pub struct MockVertexDescription;

impl MockVertexDescription {
    pub fn new() -> Arc<dyn VertexDescription> {
        Arc::new(Self)
    }
}

impl VertexDescription for MockVertexDescription {}

#[derive(Debug)]
pub struct MockSurface;

impl Surface for MockSurface {}

#[derive(Debug)]
pub struct MockTexture {
    pub width: u32,
    pub height: u32,
}

impl MockTexture {
    pub fn new(width: u32, height: u32) -> Arc<dyn Texture2d> {
        Arc::new(Self { width, height })
    }
}

impl Texture2d for MockTexture {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn surface(&self) -> Option<Arc<dyn Surface>> {
        Some(Arc::new(MockSurface))
    }
}

#[derive(Debug)]
pub struct MockRenderContext;

impl MockRenderContext {
    pub fn new() -> Arc<dyn RenderContext> {
        Arc::new(Self)
    }
}

impl RenderContext for MockRenderContext {
    fn back_buffer_surface(&self) -> Option<Arc<dyn Surface>> {
        Some(Arc::new(MockSurface))
    }
}

/// Stands in for every fixed-function state object
#[derive(Debug)]
pub struct MockState;

impl RasterizerState for MockState {}
impl BlendState for MockState {}
impl DepthStencilState for MockState {}
impl SamplerState for MockState {}

// ============================================================================
// Mock ConstantBuffer
// ============================================================================

#[derive(Debug)]
pub struct MockConstantBuffer {
    pub label: &'static str,
    pub size: u64,
    pub uploads: AtomicUsize,
    pub last_data: Mutex<Vec<u8>>,
}

impl MockConstantBuffer {
    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    /// Last uploaded contents reinterpreted as floats
    pub fn last_floats(&self) -> Vec<f32> {
        let data = self.last_data.lock().unwrap();
        data.chunks_exact(4).map(bytemuck::pod_read_unaligned::<f32>).collect()
    }
}

impl ConstantBuffer for MockConstantBuffer {
    fn size(&self) -> u64 {
        self.size
    }

    fn label(&self) -> &str {
        self.label
    }

    fn upload(&self, _hint: MapHint, data: &[u8]) -> Result<()> {
        if data.len() as u64 > self.size {
            engine_bail!("scene3d::mock",
                "upload of {} bytes exceeds '{}' size {}", data.len(), self.label, self.size);
        }
        self.uploads.fetch_add(1, Ordering::SeqCst);
        *self.last_data.lock().unwrap() = data.to_vec();
        Ok(())
    }
}

// ============================================================================
// Mock CommandList
// ============================================================================

#[derive(Debug, Default)]
pub struct MockCommandList {
    pub commands: Vec<String>,
}

fn labels(buffers: &[Arc<dyn ConstantBuffer>]) -> String {
    buffers.iter().map(|buffer| buffer.label()).collect::<Vec<_>>().join(",")
}

fn shader_name(shader: Option<&Arc<dyn Shader>>) -> &str {
    shader.map(|shader| shader.name()).unwrap_or("null")
}

fn presence<T: ?Sized>(value: Option<&Arc<T>>) -> &'static str {
    if value.is_some() { "set" } else { "null" }
}

impl CommandList for MockCommandList {
    fn begin_scene(&mut self) -> Result<()> {
        self.commands.push("begin_scene".to_string());
        Ok(())
    }

    fn end_scene(&mut self) -> Result<()> {
        self.commands.push("end_scene".to_string());
        Ok(())
    }

    fn set_render_surfaces(
        &mut self,
        color: Option<&Arc<dyn Surface>>,
        depth_stencil: Option<&Arc<dyn Surface>>,
    ) -> Result<()> {
        self.commands.push(format!(
            "set_render_surfaces({}, {})", presence(color), presence(depth_stencil)));
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.commands.push(format!("set_viewport({}x{})", viewport.width, viewport.height));
        Ok(())
    }

    fn clear(&mut self, flags: ClearFlags, _color: Vec4, _depth: f32, _stencil: u8) -> Result<()> {
        self.commands.push(format!("clear({:?})", flags));
        Ok(())
    }

    fn set_rasterizer_state(&mut self, state: Option<&Arc<dyn RasterizerState>>) -> Result<()> {
        self.commands.push(format!("set_rasterizer_state({})", presence(state)));
        Ok(())
    }

    fn set_blend_state(&mut self, state: Option<&Arc<dyn BlendState>>) -> Result<()> {
        self.commands.push(format!("set_blend_state({})", presence(state)));
        Ok(())
    }

    fn set_depth_stencil_state(
        &mut self,
        state: Option<&Arc<dyn DepthStencilState>>,
        _stencil_reference: u8,
    ) -> Result<()> {
        self.commands.push(format!("set_depth_stencil_state({})", presence(state)));
        Ok(())
    }

    fn set_vertex_shader(&mut self, shader: Option<&Arc<dyn Shader>>) -> Result<()> {
        self.commands.push(format!("set_vertex_shader({})", shader_name(shader)));
        Ok(())
    }

    fn set_pixel_shader(&mut self, shader: Option<&Arc<dyn Shader>>) -> Result<()> {
        self.commands.push(format!("set_pixel_shader({})", shader_name(shader)));
        Ok(())
    }

    fn set_vertex_constant_buffers(
        &mut self,
        start_slot: u32,
        buffers: &[Arc<dyn ConstantBuffer>],
    ) -> Result<()> {
        self.commands.push(format!("set_vertex_constant_buffers({}:{})", start_slot, labels(buffers)));
        Ok(())
    }

    fn set_pixel_constant_buffers(
        &mut self,
        start_slot: u32,
        buffers: &[Arc<dyn ConstantBuffer>],
    ) -> Result<()> {
        self.commands.push(format!("set_pixel_constant_buffers({}:{})", start_slot, labels(buffers)));
        Ok(())
    }

    fn set_vertex_buffer(
        &mut self,
        slot: u32,
        _buffer: &Arc<dyn Buffer>,
        stride: u32,
        _offset: u32,
    ) -> Result<()> {
        self.commands.push(format!("set_vertex_buffer({}, stride={})", slot, stride));
        Ok(())
    }

    fn set_index_buffer(&mut self, _buffer: &Arc<dyn Buffer>) -> Result<()> {
        self.commands.push("set_index_buffer".to_string());
        Ok(())
    }

    fn set_vertex_description(&mut self, _description: &Arc<dyn VertexDescription>) -> Result<()> {
        self.commands.push("set_vertex_description".to_string());
        Ok(())
    }

    fn set_sampler_state(&mut self, slot: u32, state: Option<&Arc<dyn SamplerState>>) -> Result<()> {
        self.commands.push(format!("set_sampler_state({}, {})", slot, presence(state)));
        Ok(())
    }

    fn set_texture(&mut self, slot: u32, texture: Option<&Arc<dyn Texture2d>>) -> Result<()> {
        self.commands.push(format!("set_texture({}, {})", slot, presence(texture)));
        Ok(())
    }

    fn draw_indexed(&mut self, args: DrawIndexedArgs) -> Result<()> {
        self.commands.push(format!(
            "draw_indexed(start_index={}, primitives={})", args.start_index, args.primitive_count));
        Ok(())
    }
}

// ============================================================================
// Mock QuadDrawer
// ============================================================================

#[derive(Debug, Default)]
pub struct MockQuadDrawer {
    pub quads: Vec<[ScreenVertex; 4]>,
    pub flushes: usize,
}

impl QuadDrawer for MockQuadDrawer {
    fn draw_screen_quad(
        &mut self,
        vertices: [ScreenVertex; 4],
        _texture: &Arc<dyn Texture2d>,
    ) -> Result<()> {
        self.quads.push(vertices);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

pub struct MockDevice {
    pub status: DeviceStatus,
    /// Status reported after `reset()`
    pub status_after_reset: DeviceStatus,
    pub reset_calls: usize,
    pub fail_buffer_creation: bool,
    pub buffers: Vec<Arc<MockConstantBuffer>>,
    pub command_list: MockCommandList,
    pub quad_drawer: MockQuadDrawer,
}

impl MockDevice {
    pub fn new() -> Self {
        Self {
            status: DeviceStatus::Ready,
            status_after_reset: DeviceStatus::Ready,
            reset_calls: 0,
            fail_buffer_creation: false,
            buffers: Vec::new(),
            command_list: MockCommandList::default(),
            quad_drawer: MockQuadDrawer::default(),
        }
    }

    pub fn commands(&self) -> &[String] {
        &self.command_list.commands
    }

    pub fn count_commands(&self, prefix: &str) -> usize {
        self.commands().iter().filter(|command| command.starts_with(prefix)).count()
    }

    pub fn buffers_with_label(&self, label: &str) -> Vec<Arc<MockConstantBuffer>> {
        self.buffers.iter().filter(|buffer| buffer.label == label).cloned().collect()
    }

    /// Total uploads across every buffer carrying `label`
    pub fn uploads_with_label(&self, label: &str) -> usize {
        self.buffers_with_label(label).iter().map(|buffer| buffer.upload_count()).sum()
    }

    pub fn clear_commands(&mut self) {
        self.command_list.commands.clear();
    }
}

impl GraphicsDevice for MockDevice {
    fn status(&self) -> DeviceStatus {
        self.status
    }

    fn reset(&mut self) -> DeviceStatus {
        self.reset_calls += 1;
        self.status = self.status_after_reset;
        self.status
    }

    fn create_constant_buffer(&mut self, desc: &BufferDesc) -> Result<Arc<dyn ConstantBuffer>> {
        if self.fail_buffer_creation {
            return Err(Error::OutOfMemory);
        }
        let buffer = Arc::new(MockConstantBuffer {
            label: desc.label,
            size: desc.size,
            uploads: AtomicUsize::new(0),
            last_data: Mutex::new(Vec::new()),
        });
        self.buffers.push(buffer.clone());
        Ok(buffer)
    }

    fn command_list(&mut self) -> &mut dyn CommandList {
        &mut self.command_list
    }

    fn quad_drawer(&mut self) -> &mut dyn QuadDrawer {
        &mut self.quad_drawer
    }
}

// ============================================================================
// Mock RenderResources
// ============================================================================

pub struct MockResources {
    pub scene_texture: Option<Arc<dyn Texture2d>>,
    pub shadow_texture: Option<Arc<dyn Texture2d>>,
    pub shadow_usable_size: u32,
    pub pre_pass_shader: Option<Arc<ShaderVariant>>,
}

impl MockResources {
    /// Scene texture, 1024² shadow map and a pre-pass shader with static and skinned permutations
    pub fn new() -> Self {
        Self {
            scene_texture: Some(MockTexture::new(800, 600)),
            shadow_texture: Some(MockTexture::new(1024, 1024)),
            shadow_usable_size: 1024,
            pre_pass_shader: Some(Arc::new(mock_variant(100, "pre_pass_vs"))),
        }
    }
}

impl RenderResources for MockResources {
    fn rasterizer_state(&self, _kind: RasterizerStateKind) -> Option<Arc<dyn RasterizerState>> {
        Some(Arc::new(MockState))
    }

    fn blend_state(&self, _kind: BlendStateKind) -> Option<Arc<dyn BlendState>> {
        Some(Arc::new(MockState))
    }

    fn depth_stencil_state(&self, kind: DepthStencilStateKind) -> Option<Arc<dyn DepthStencilState>> {
        // Composite binds "no depth" as a null state
        match kind {
            DepthStencilStateKind::None => None,
            _ => Some(Arc::new(MockState)),
        }
    }

    fn sampler_state(
        &self,
        _filter: TextureFilter,
        _address_mode: TextureAddressMode,
    ) -> Option<Arc<dyn SamplerState>> {
        Some(Arc::new(MockState))
    }

    fn shadow_sampler_state(&self) -> Option<Arc<dyn SamplerState>> {
        Some(Arc::new(MockState))
    }

    fn scene_texture(&self) -> Option<Arc<dyn Texture2d>> {
        self.scene_texture.clone()
    }

    fn shadow_depth_texture(&self) -> Option<Arc<dyn Texture2d>> {
        self.shadow_texture.clone()
    }

    fn shadow_depth_usable_size(&self) -> u32 {
        self.shadow_usable_size
    }

    fn pre_pass_vertex_shader(&self) -> Option<Arc<ShaderVariant>> {
        self.pre_pass_shader.clone()
    }
}

/// Variant with a permutation for every skinning option and shadow mode
pub fn mock_variant(id: u32, name: &str) -> ShaderVariant {
    let mut shaders = Vec::new();
    for skinning in [SkinningOption::None, SkinningOption::Smooth, SkinningOption::Rigid] {
        for shadows in [ShadowMode::None, ShadowMode::Simple, ShadowMode::PcfDithered] {
            shaders.push((
                ShaderOptionSet::new(skinning, shadows),
                MockShader::new(&format!("{}:{:?}:{:?}", name, skinning, shadows)),
            ));
        }
    }

    let desc = ShaderVariantDesc {
        id,
        name: name.to_string(),
        shaders,
        sampler_inputs: Vec::new(),
        texture_inputs: Vec::new(),
    };
    match ShaderVariant::from_desc(desc) {
        Ok(variant) => variant,
        Err(error) => panic!("mock variant '{}' invalid: {}", name, error),
    }
}
