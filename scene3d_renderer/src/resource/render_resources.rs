//! Resource manager interface consumed by the scene.
//!
//! Supplies the fixed state objects by name, the shared render targets and
//! the built-in shader variants. Passed into `GraphicsScene::update` each
//! frame alongside the device.

use std::sync::Arc;
use crate::device::{
    BlendState, BlendStateKind, DepthStencilState, DepthStencilStateKind,
    RasterizerState, RasterizerStateKind, SamplerState, TextureAddressMode,
    TextureFilter, Texture2d,
};
use super::shader_variant::ShaderVariant;

pub trait RenderResources {
    fn rasterizer_state(&self, kind: RasterizerStateKind) -> Option<Arc<dyn RasterizerState>>;

    fn blend_state(&self, kind: BlendStateKind) -> Option<Arc<dyn BlendState>>;

    fn depth_stencil_state(&self, kind: DepthStencilStateKind) -> Option<Arc<dyn DepthStencilState>>;

    fn sampler_state(
        &self,
        filter: TextureFilter,
        address_mode: TextureAddressMode,
    ) -> Option<Arc<dyn SamplerState>>;

    /// Sampler used for shadow map lookups
    fn shadow_sampler_state(&self) -> Option<Arc<dyn SamplerState>>;

    /// Off-screen color target every view renders into before compositing
    fn scene_texture(&self) -> Option<Arc<dyn Texture2d>>;

    /// Shadow depth target; absent when shadows are disabled
    fn shadow_depth_texture(&self) -> Option<Arc<dyn Texture2d>>;

    /// Edge length in texels of the shadow map region actually rendered to.
    /// May be smaller than the texture when the requested size was not a power of two.
    fn shadow_depth_usable_size(&self) -> u32;

    /// Vertex shader used by the depth-only passes
    fn pre_pass_vertex_shader(&self) -> Option<Arc<ShaderVariant>>;
}
