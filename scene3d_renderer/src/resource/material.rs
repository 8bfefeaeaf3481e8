//! Material: the shader variants, constant buffers and textures of a surface.
//!
//! Materials are built by the resource system and shared between sub-meshes.
//! The base pass groups draws by the material's shader variants and rebinds
//! material state only when it changes between consecutive draws.

use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::device::{ConstantBuffer, Texture2d};
use crate::engine_bail;
use crate::error::Result;
use super::shader_variant::ShaderVariant;

// ===== MATERIAL TEXTURE =====

/// A texture bound to a named shader texture input
pub struct MaterialTexture {
    name: String,
    texture: Option<Arc<dyn Texture2d>>,
}

impl MaterialTexture {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn texture(&self) -> Option<&Arc<dyn Texture2d>> {
        self.texture.as_ref()
    }
}

// ===== MATERIAL =====

/// Material resource
pub struct Material {
    name: String,
    vertex_variant: Option<Arc<ShaderVariant>>,
    pixel_variant: Option<Arc<ShaderVariant>>,
    vertex_constants: Option<Arc<dyn ConstantBuffer>>,
    pixel_constants: Option<Arc<dyn ConstantBuffer>>,
    textures: Vec<MaterialTexture>,
    texture_names: FxHashMap<String, usize>,
}

// ===== DESCRIPTORS =====

/// Material creation descriptor
#[derive(Default)]
pub struct MaterialDesc {
    pub name: String,
    pub vertex_variant: Option<Arc<ShaderVariant>>,
    pub pixel_variant: Option<Arc<ShaderVariant>>,
    /// User parameters for the vertex shader, already uploaded
    pub vertex_constants: Option<Arc<dyn ConstantBuffer>>,
    /// User parameters for the pixel shader, already uploaded
    pub pixel_constants: Option<Arc<dyn ConstantBuffer>>,
    /// (input name, texture) pairs; a `None` texture leaves the input unbound
    pub textures: Vec<(String, Option<Arc<dyn Texture2d>>)>,
}

// ===== MATERIAL IMPLEMENTATION =====

impl Material {
    /// Create a material from a descriptor
    ///
    /// Fails on duplicate texture input names.
    pub fn from_desc(desc: MaterialDesc) -> Result<Self> {
        let mut textures = Vec::with_capacity(desc.textures.len());
        let mut texture_names = FxHashMap::default();

        for (name, texture) in desc.textures {
            if texture_names.insert(name.clone(), textures.len()).is_some() {
                engine_bail!("scene3d::Material",
                    "Material '{}': duplicate texture input '{}'", desc.name, name);
            }
            textures.push(MaterialTexture { name, texture });
        }

        Ok(Self {
            name: desc.name,
            vertex_variant: desc.vertex_variant,
            pixel_variant: desc.pixel_variant,
            vertex_constants: desc.vertex_constants,
            pixel_constants: desc.pixel_constants,
            textures,
            texture_names,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertex_variant(&self) -> Option<&Arc<ShaderVariant>> {
        self.vertex_variant.as_ref()
    }

    pub fn pixel_variant(&self) -> Option<&Arc<ShaderVariant>> {
        self.pixel_variant.as_ref()
    }

    pub fn vertex_constants(&self) -> Option<&Arc<dyn ConstantBuffer>> {
        self.vertex_constants.as_ref()
    }

    pub fn pixel_constants(&self) -> Option<&Arc<dyn ConstantBuffer>> {
        self.pixel_constants.as_ref()
    }

    pub fn textures(&self) -> &[MaterialTexture] {
        &self.textures
    }

    /// Texture bound to a named input
    pub fn texture_by_name(&self, name: &str) -> Option<&Arc<dyn Texture2d>> {
        self.texture_names.get(name)
            .and_then(|&index| self.textures[index].texture())
    }

    /// Sort key of the base pass: vertex variant id, then pixel variant id.
    /// A missing variant sorts before any present one.
    pub fn variant_key(&self) -> (Option<u32>, Option<u32>) {
        (
            self.vertex_variant.as_ref().map(|variant| variant.id()),
            self.pixel_variant.as_ref().map(|variant| variant.id()),
        )
    }
}

#[cfg(test)]
#[path = "material_tests.rs"]
mod tests;
