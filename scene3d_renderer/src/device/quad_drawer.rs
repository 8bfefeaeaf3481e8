//! Immediate-mode screen-space quad drawing

use std::sync::Arc;
use glam::{Vec2, Vec3, Vec4};
use crate::error::Result;
use super::texture::Texture2d;

/// Vertex of a screen-space primitive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenVertex {
    /// Position in clip space (z = depth)
    pub position: Vec3,
    pub color: Vec4,
    pub tex_coords: Vec2,
}

/// Dynamic draw buffer pool used for full-screen and debug quads
pub trait QuadDrawer: Send + Sync {
    /// Queue a textured quad given as a 4-vertex triangle strip
    fn draw_screen_quad(
        &mut self,
        vertices: [ScreenVertex; 4],
        texture: &Arc<dyn Texture2d>,
    ) -> Result<()>;

    /// Submit all queued quads
    fn flush(&mut self) -> Result<()>;
}
