//! SceneView: one camera rendering into one render context.
//!
//! Owned by the scene's view pool and driven by camera logic between
//! frames. Mutators only store parameters and mark the view dirty; the
//! matrices and frustum are recomputed by `conditional_update()` at the
//! start of the next frame.

use std::sync::Arc;
use glam::{Mat4, Vec3, Vec4};
use crate::device::{RenderContext, Surface, Viewport};
use super::frustum::Frustum;

const MIN_CLIP_DISTANCE: f32 = 1e-4;
const MIN_FOV_DEGREES: f32 = 1e-3;
const MAX_FOV_DEGREES: f32 = 179.0;

/// Camera parameters plus a cache of derived matrices.
///
/// Invariant: the cached matrices and frustum match the parameters if and
/// only if `is_dirty()` returns false.
#[derive(Clone)]
pub struct SceneView {
    render_context: Option<Arc<dyn RenderContext>>,
    depth_stencil_surface: Option<Arc<dyn Surface>>,

    origin: Vec3,
    forward: Vec3,
    up: Vec3,

    viewport: Viewport,
    clear_color: Vec4,

    aspect_ratio: f32,
    horizontal_fov: f32,
    near_clip: f32,
    far_clip: f32,

    shadow_cutoff_distance: f32,
    shadow_fade_distance: f32,

    // ===== CACHE =====
    dirty: bool,
    view_matrix: Mat4,
    inverse_view_matrix: Mat4,
    projection_matrix: Mat4,
    view_projection_matrix: Mat4,
    inverse_view_projection_matrix: Mat4,
    frustum: Frustum,
}

impl Default for SceneView {
    fn default() -> Self {
        let mut view = Self {
            render_context: None,
            depth_stencil_surface: None,
            origin: Vec3::ZERO,
            forward: Vec3::Z,
            up: Vec3::Y,
            viewport: Viewport::default(),
            clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            aspect_ratio: 1.0,
            horizontal_fov: 90.0,
            near_clip: 0.1,
            far_clip: 1000.0,
            shadow_cutoff_distance: 1000.0,
            shadow_fade_distance: 100.0,
            dirty: true,
            view_matrix: Mat4::IDENTITY,
            inverse_view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            view_projection_matrix: Mat4::IDENTITY,
            inverse_view_projection_matrix: Mat4::IDENTITY,
            frustum: Frustum::default(),
        };
        view.update();
        view
    }
}

impl SceneView {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== SETTERS =====

    /// Set the render context this view composites into
    pub fn set_render_context(&mut self, render_context: Option<Arc<dyn RenderContext>>) {
        self.render_context = render_context;
    }

    /// Set the depth-stencil surface used while rendering this view
    pub fn set_depth_stencil_surface(&mut self, surface: Option<Arc<dyn Surface>>) {
        self.depth_stencil_surface = surface;
    }

    /// Set the camera position and orientation.
    ///
    /// `forward` and `up` need not be normalized or orthogonal. A zero
    /// `forward` keeps the previous direction.
    pub fn set_view(&mut self, origin: Vec3, forward: Vec3, up: Vec3) {
        self.origin = origin;
        self.forward = forward.try_normalize().unwrap_or(self.forward);
        self.up = orthonormal_up(self.forward, up);
        self.dirty = true;
    }

    pub fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32) {
        self.viewport = Viewport { x, y, width, height };
    }

    pub fn set_clear_color(&mut self, color: Vec4) {
        self.clear_color = color;
    }

    /// Set the horizontal field of view in degrees
    pub fn set_horizontal_fov(&mut self, degrees: f32) {
        self.horizontal_fov = degrees.clamp(MIN_FOV_DEGREES, MAX_FOV_DEGREES);
        self.dirty = true;
    }

    /// Set the width / height ratio used by the projection
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio.max(MIN_CLIP_DISTANCE);
        self.dirty = true;
    }

    pub fn set_near_clip(&mut self, distance: f32) {
        self.near_clip = distance.max(MIN_CLIP_DISTANCE);
        self.dirty = true;
    }

    pub fn set_far_clip(&mut self, distance: f32) {
        self.far_clip = distance;
        self.dirty = true;
    }

    /// Distance along the view axis beyond which nothing casts shadows
    pub fn set_shadow_cutoff_distance(&mut self, distance: f32) {
        self.shadow_cutoff_distance = distance.max(0.0);
    }

    /// Distance before the cutoff over which shadows fade out
    pub fn set_shadow_fade_distance(&mut self, distance: f32) {
        self.shadow_fade_distance = distance.max(0.0);
    }

    // ===== GETTERS =====

    pub fn render_context(&self) -> Option<&Arc<dyn RenderContext>> {
        self.render_context.as_ref()
    }

    pub fn depth_stencil_surface(&self) -> Option<&Arc<dyn Surface>> {
        self.depth_stencil_surface.as_ref()
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Unit view direction
    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    /// Unit up vector, orthogonal to `forward()`
    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn clear_color(&self) -> Vec4 {
        self.clear_color
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn horizontal_fov(&self) -> f32 {
        self.horizontal_fov
    }

    /// Vertical field of view in radians derived from the horizontal FOV and aspect ratio
    pub fn vertical_fov_radians(&self) -> f32 {
        let half_horizontal = self.horizontal_fov.to_radians() * 0.5;
        2.0 * (half_horizontal.tan() / self.aspect_ratio).atan()
    }

    pub fn near_clip(&self) -> f32 {
        self.near_clip
    }

    /// Far clip distance, never closer than just beyond the near clip
    pub fn far_clip(&self) -> f32 {
        self.far_clip.max(self.near_clip + MIN_CLIP_DISTANCE)
    }

    pub fn shadow_cutoff_distance(&self) -> f32 {
        self.shadow_cutoff_distance
    }

    pub fn shadow_fade_distance(&self) -> f32 {
        self.shadow_fade_distance
    }

    // ===== CACHED MATRICES =====

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// World to view transform
    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    /// View to world transform
    pub fn inverse_view_matrix(&self) -> &Mat4 {
        &self.inverse_view_matrix
    }

    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// World to clip transform (projection * view)
    pub fn view_projection_matrix(&self) -> &Mat4 {
        &self.view_projection_matrix
    }

    /// Clip to world transform
    pub fn inverse_view_projection_matrix(&self) -> &Mat4 {
        &self.inverse_view_projection_matrix
    }

    /// World-space frustum
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    // ===== UPDATE =====

    /// Recompute the cached matrices if any parameter changed.
    ///
    /// Returns whether an update happened.
    pub fn conditional_update(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        self.update();
        true
    }

    fn update(&mut self) {
        self.view_matrix = Mat4::look_to_lh(self.origin, self.forward, self.up);
        self.inverse_view_matrix = self.view_matrix.inverse();
        self.projection_matrix = self.projection_with_far(self.far_clip());
        self.view_projection_matrix = self.projection_matrix * self.view_matrix;
        self.inverse_view_projection_matrix = self.view_projection_matrix.inverse();
        self.frustum = Frustum::from_view_projection(&self.view_projection_matrix);
        self.dirty = false;
    }

    /// Frustum of this view with its far plane pulled in to `distance`
    /// (never beyond the actual far clip).
    ///
    /// Computed from the current parameters, so it is valid even while the view is dirty.
    pub fn clipped_frustum(&self, distance: f32) -> Frustum {
        let far = distance
            .min(self.far_clip())
            .max(self.near_clip + MIN_CLIP_DISTANCE);
        let view = Mat4::look_to_lh(self.origin, self.forward, self.up);
        Frustum::from_view_projection(&(self.projection_with_far(far) * view))
    }

    fn projection_with_far(&self, far: f32) -> Mat4 {
        Mat4::perspective_lh(self.vertical_fov_radians(), self.aspect_ratio, self.near_clip, far)
    }
}

/// Unit up vector orthogonal to `forward`, as close to `up` as possible.
///
/// Falls back to world Y (or world Z when looking along Y) if `up` is
/// zero or parallel to `forward`.
fn orthonormal_up(forward: Vec3, up: Vec3) -> Vec3 {
    let candidates = [up, Vec3::Y, Vec3::Z];
    for candidate in candidates {
        let orthogonal = candidate - forward * forward.dot(candidate);
        if let Some(normalized) = orthogonal.try_normalize() {
            if orthogonal.length_squared() > 1e-6 {
                return normalized;
            }
        }
    }
    Vec3::X
}

#[cfg(test)]
#[path = "scene_view_tests.rs"]
mod tests;
