//! Frustum: six clipping planes and eight corners.
//!
//! Each plane is a Vec4 (A, B, C, D) where:
//! - (A, B, C) is the unit inward-pointing normal
//! - D is the signed distance
//! - A point P is inside if dot(plane, P_homogeneous) >= 0 for all planes
//!
//! Built from a view-projection matrix using the Direct3D clip convention
//! (x, y in [-w, w], z in [0, w]), which is what `Mat4::perspective_lh`
//! and `Mat4::orthographic_lh` produce.

use glam::{Mat4, Vec3, Vec4};
use super::bounding_sphere::BoundingSphere;

/// Frustum plane indices
pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

/// Corner count of a frustum
pub const CORNER_COUNT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// Frustum planes: left, right, bottom, top, near, far
    pub planes: [Vec4; 6],
    /// World-space corners. Index bits: 1 = right, 2 = top, 4 = far.
    pub corners: [Vec3; CORNER_COUNT],
}

impl Default for Frustum {
    fn default() -> Self {
        Self::from_view_projection(&Mat4::IDENTITY)
    }
}

impl Frustum {
    /// Extract planes (Gribb & Hartmann) and corners from a view-projection matrix.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let m = vp.to_cols_array_2d();

        let mut planes = [
            // Left:   row3 + row0
            Vec4::new(m[0][3] + m[0][0], m[1][3] + m[1][0], m[2][3] + m[2][0], m[3][3] + m[3][0]),
            // Right:  row3 - row0
            Vec4::new(m[0][3] - m[0][0], m[1][3] - m[1][0], m[2][3] - m[2][0], m[3][3] - m[3][0]),
            // Bottom: row3 + row1
            Vec4::new(m[0][3] + m[0][1], m[1][3] + m[1][1], m[2][3] + m[2][1], m[3][3] + m[3][1]),
            // Top:    row3 - row1
            Vec4::new(m[0][3] - m[0][1], m[1][3] - m[1][1], m[2][3] - m[2][1], m[3][3] - m[3][1]),
            // Near:   row2 (z >= 0)
            Vec4::new(m[0][2], m[1][2], m[2][2], m[3][2]),
            // Far:    row3 - row2
            Vec4::new(m[0][3] - m[0][2], m[1][3] - m[1][2], m[2][3] - m[2][2], m[3][3] - m[3][2]),
        ];

        for plane in &mut planes {
            let normal_len = plane.truncate().length();
            if normal_len > 0.0 {
                *plane /= normal_len;
            }
        }

        let inverse = vp.inverse();
        let mut corners = [Vec3::ZERO; CORNER_COUNT];
        for (index, corner) in corners.iter_mut().enumerate() {
            let ndc = Vec3::new(
                if index & 1 != 0 { 1.0 } else { -1.0 },
                if index & 2 != 0 { 1.0 } else { -1.0 },
                if index & 4 != 0 { 1.0 } else { 0.0 },
            );
            *corner = inverse.project_point3(ndc);
        }

        Self { planes, corners }
    }

    /// Signed distance from a plane to a point (positive inside)
    pub fn plane_distance(&self, plane: usize, point: Vec3) -> f32 {
        let plane = self.planes[plane];
        plane.truncate().dot(point) + plane.w
    }

    /// Whether a sphere is at least partially inside.
    ///
    /// A sphere is rejected only when it lies entirely on the outer side of
    /// some plane. Degenerate spheres are tested as points; the fail-open
    /// policy for bad bounds is applied by the visibility stage.
    pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> bool {
        (0..self.planes.len())
            .all(|plane| self.plane_distance(plane, sphere.center) >= -sphere.radius)
    }

    /// Whether a point is inside
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.intersects_sphere(&BoundingSphere::new(point, 0.0))
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
