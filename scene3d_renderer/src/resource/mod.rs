//! Resource-side types the scene consumes: materials, shader variants and
//! the resource manager interface.

pub mod material;
pub mod render_resources;
pub mod shader_variant;

pub use material::{Material, MaterialDesc, MaterialTexture};
pub use render_resources::RenderResources;
pub use shader_variant::{
    shadow_option_name, ShaderInput, ShaderOptionSet, ShaderVariant, ShaderVariantDesc,
    SkinningOption,
};
