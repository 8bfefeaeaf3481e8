//! Surface and texture traits

use std::sync::Arc;

/// Render surface (color or depth-stencil attachment)
pub trait Surface: Send + Sync {}

/// 2D texture resource
pub trait Texture2d: Send + Sync {
    /// Width in texels of the top mip level
    fn width(&self) -> u32;

    /// Height in texels of the top mip level
    fn height(&self) -> u32;

    /// Surface for rendering into the top mip level, if the texture is a render target
    fn surface(&self) -> Option<Arc<dyn Surface>>;
}

/// Presentation target of a view (window swap chain, editor panel, ...)
pub trait RenderContext: Send + Sync {
    /// Surface to composite the final image into
    fn back_buffer_surface(&self) -> Option<Arc<dyn Surface>>;
}
