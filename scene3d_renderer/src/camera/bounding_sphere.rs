//! World-space bounding sphere used for visibility tests

use glam::Vec3;

/// Bounding sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Default for BoundingSphere {
    /// Degenerate sphere at the origin (always treated as visible)
    fn default() -> Self {
        Self { center: Vec3::ZERO, radius: 0.0 }
    }
}

impl BoundingSphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Whether the sphere carries no usable bounds (zero, negative or
    /// non-finite radius, or a non-finite center)
    pub fn is_degenerate(&self) -> bool {
        !(self.radius > 0.0 && self.radius.is_finite() && self.center.is_finite())
    }
}
