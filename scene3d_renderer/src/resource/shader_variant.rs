//! Shader variants selected by a small set of named options.
//!
//! A ShaderVariant is one shader family (e.g. the "lit opaque" vertex shader)
//! compiled once per combination of options. The scene asks for the
//! compiled shader matching the options of the draw it is issuing.

use std::fmt;
use std::sync::Arc;
use rustc_hash::{FxHashMap, FxHashSet};
use crate::config::ShadowMode;
use crate::device::Shader;
use crate::engine_bail;
use crate::error::Result;

// ===== OPTIONS =====

/// SKINNING shader option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SkinningOption {
    /// Static mesh (NONE)
    #[default]
    None,
    /// Smooth-skinned mesh (SKINNING_SMOOTH)
    Smooth,
    /// Rigid-skinned mesh (SKINNING_RIGID)
    Rigid,
}

impl SkinningOption {
    /// Option value name as written in shader sources
    pub fn name(self) -> &'static str {
        match self {
            SkinningOption::None => "NONE",
            SkinningOption::Smooth => "SKINNING_SMOOTH",
            SkinningOption::Rigid => "SKINNING_RIGID",
        }
    }
}

/// Name of the SHADOWS option value matching a shadow mode
pub fn shadow_option_name(mode: ShadowMode) -> &'static str {
    match mode {
        ShadowMode::None => "NONE",
        ShadowMode::Simple => "SHADOWS_SIMPLE",
        ShadowMode::PcfDithered => "SHADOWS_PCF_DITHERED",
    }
}

/// Full option selection used to pick a compiled shader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ShaderOptionSet {
    pub skinning: SkinningOption,
    pub shadows: ShadowMode,
}

impl ShaderOptionSet {
    pub fn new(skinning: SkinningOption, shadows: ShadowMode) -> Self {
        Self { skinning, shadows }
    }
}

impl fmt::Display for ShaderOptionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SKINNING={} SHADOWS={}",
            self.skinning.name(),
            shadow_option_name(self.shadows)
        )
    }
}

// ===== INPUT BINDINGS =====

/// Named sampler or texture input of a pixel shader, with its bind slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderInput {
    pub name: String,
    pub bind_index: u32,
}

// ===== SHADER VARIANT =====

/// One shader family with its compiled permutations
pub struct ShaderVariant {
    id: u32,
    name: String,
    shaders: FxHashMap<ShaderOptionSet, Arc<dyn Shader>>,
    sampler_inputs: Vec<ShaderInput>,
    texture_inputs: Vec<ShaderInput>,
}

/// Shader variant creation descriptor
pub struct ShaderVariantDesc {
    /// Stable identifier; draw sorting orders variants by this value
    pub id: u32,
    pub name: String,
    pub shaders: Vec<(ShaderOptionSet, Arc<dyn Shader>)>,
    pub sampler_inputs: Vec<ShaderInput>,
    pub texture_inputs: Vec<ShaderInput>,
}

impl ShaderVariant {
    /// Create a variant from a descriptor
    ///
    /// Fails if an option set is listed twice or two inputs share a name.
    pub fn from_desc(desc: ShaderVariantDesc) -> Result<Self> {
        let mut shaders = FxHashMap::default();
        for (options, shader) in desc.shaders {
            if shaders.insert(options, shader).is_some() {
                engine_bail!("scene3d::ShaderVariant",
                    "Shader variant '{}': duplicate permutation {}", desc.name, options);
            }
        }

        let mut seen = FxHashSet::default();
        for input in desc.sampler_inputs.iter().chain(desc.texture_inputs.iter()) {
            if !seen.insert(input.name.as_str()) {
                engine_bail!("scene3d::ShaderVariant",
                    "Shader variant '{}': duplicate input '{}'", desc.name, input.name);
            }
        }

        Ok(Self {
            id: desc.id,
            name: desc.name,
            shaders,
            sampler_inputs: desc.sampler_inputs,
            texture_inputs: desc.texture_inputs,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Compiled shader for an option selection, if that permutation exists
    pub fn shader(&self, options: &ShaderOptionSet) -> Option<&Arc<dyn Shader>> {
        self.shaders.get(options)
    }

    pub fn permutation_count(&self) -> usize {
        self.shaders.len()
    }

    /// Sampler inputs in declaration order
    pub fn sampler_inputs(&self) -> &[ShaderInput] {
        &self.sampler_inputs
    }

    /// Texture inputs in declaration order
    pub fn texture_inputs(&self) -> &[ShaderInput] {
        &self.texture_inputs
    }
}

impl fmt::Debug for ShaderVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderVariant")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("permutations", &self.shaders.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "shader_variant_tests.rs"]
mod tests;
