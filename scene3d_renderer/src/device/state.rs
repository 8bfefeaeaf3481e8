//! Fixed-function state objects and their symbolic names
//!
//! State objects are created by the resource manager and looked up by name;
//! the scene never builds them directly.

/// Rasterizer state object
pub trait RasterizerState: Send + Sync {}

/// Blend state object
pub trait BlendState: Send + Sync {}

/// Depth-stencil state object
pub trait DepthStencilState: Send + Sync {}

/// Sampler state object
pub trait SamplerState: Send + Sync {}

/// Named rasterizer states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RasterizerStateKind {
    /// Solid fill, back-face culling
    Default,
    /// Solid fill, no culling
    DoubleSided,
    /// Depth-biased rendering into the shadow map
    ShadowDepth,
    /// Wireframe fill
    Wireframe,
}

/// Named blend states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendStateKind {
    /// No blending
    Opaque,
    /// Color writes disabled (depth-only passes)
    NoColor,
    /// Alpha blending
    Transparent,
    /// Additive blending
    Additive,
}

/// Named depth-stencil states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepthStencilStateKind {
    /// Depth test and write
    Default,
    /// Depth test, no write
    TestOnly,
    /// No depth test, no write
    None,
}

/// Sampler filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFilter {
    Point,
    Linear,
    Anisotropic,
}

/// Sampler addressing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureAddressMode {
    Wrap,
    Clamp,
}
