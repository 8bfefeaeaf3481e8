//! Directional light shadow frustum fitting.
//!
//! The light camera is fitted around the view frustum clipped at the shadow
//! cutoff distance. Two strategies are available: an axis-aligned
//! orthographic box in light space, and a light-space perspective warp that
//! spends more shadow map texels close to the viewer.

use glam::{Mat4, Vec2, Vec3, Vec4};
use crate::camera::{SceneView, CORNER_COUNT};
use crate::config::ShadowFitMode;

/// Distance the light camera is pulled back along the light direction
pub const SHADOW_DEPTH_OFFSET: f32 = 32767.0;

/// Depth range of the orthographic light projection
pub const SHADOW_DEPTH_RANGE: f32 = 65536.0;

/// Light direction used when a zero vector is supplied
pub const DEFAULT_LIGHT_DIRECTION: Vec3 = Vec3::NEG_Y;

const MIN_EXTENT: f32 = 1e-3;
const PARALLEL_COS_THRESHOLD: f32 = 0.99;

/// Orthonormal left-handed basis looking down the light direction
#[derive(Debug, Clone, Copy)]
struct LightBasis {
    right: Vec3,
    up: Vec3,
    forward: Vec3,
}

impl LightBasis {
    fn new(forward: Vec3) -> Self {
        // World Z replaces world Y when the light is (anti)parallel to it
        let world_up = if forward.dot(Vec3::Y).abs() > 0.999 { Vec3::Z } else { Vec3::Y };
        let right = world_up.cross(forward).normalize();
        let up = forward.cross(right);
        Self { right, up, forward }
    }
}

/// Compute the light view-projection matrix covering `view` up to its
/// shadow cutoff distance.
pub fn compute_shadow_frustum(view: &SceneView, light_direction: Vec3, mode: ShadowFitMode) -> Mat4 {
    let direction = light_direction.try_normalize().unwrap_or(DEFAULT_LIGHT_DIRECTION);
    let far = view.shadow_cutoff_distance().min(view.far_clip());
    let corners = view.clipped_frustum(far).corners;

    match mode {
        ShadowFitMode::Simple => simple_fit(&corners, direction),
        ShadowFitMode::LightSpacePerspective => {
            light_space_perspective_fit(view, &corners, far, direction)
                .unwrap_or_else(|| simple_fit(&corners, direction))
        }
    }
}

/// Orthographic box around the corners, with a fixed depth range starting
/// far behind them toward the light.
fn simple_fit(corners: &[Vec3; CORNER_COUNT], direction: Vec3) -> Mat4 {
    let basis = LightBasis::new(direction);

    let mut min = Vec2::splat(f32::MAX);
    let mut max = Vec2::splat(f32::MIN);
    for corner in corners {
        let projected = Vec2::new(corner.dot(basis.right), corner.dot(basis.up));
        min = min.min(projected);
        max = max.max(projected);
    }

    let center = (min + max) * 0.5;
    let half_extent = (max - min).max(Vec2::splat(MIN_EXTENT)) * 0.5;
    let origin = basis.right * center.x + basis.up * center.y - basis.forward * SHADOW_DEPTH_OFFSET;

    let light_view = Mat4::look_to_lh(origin, basis.forward, basis.up);
    let projection = Mat4::orthographic_lh(
        -half_extent.x, half_extent.x,
        -half_extent.y, half_extent.y,
        0.0, SHADOW_DEPTH_RANGE,
    );
    projection * light_view
}

/// Light-space perspective warp along the view axis projected onto the
/// light's image plane.
///
/// Returns `None` when the view looks (nearly) along the light, where the
/// warp degenerates.
fn light_space_perspective_fit(
    view: &SceneView,
    corners: &[Vec3; CORNER_COUNT],
    far: f32,
    direction: Vec3,
) -> Option<Mat4> {
    let view_direction = view.forward();
    let cos_gamma = view_direction.dot(direction);
    if cos_gamma.abs() > PARALLEL_COS_THRESHOLD {
        return None;
    }
    let sin_gamma = (1.0 - cos_gamma * cos_gamma).sqrt();

    // Light space: z along the light, y along the projected view direction
    let warp_axis = (view_direction - direction * cos_gamma).try_normalize()?;
    let light_rotation = Mat4::look_to_lh(Vec3::ZERO, direction, warp_axis);

    let (min, max) = bounds(corners.iter().map(|&corner| light_rotation.transform_point3(corner)));
    let depth = max.y - min.y;
    if depth <= MIN_EXTENT {
        return None;
    }

    let z_near = view.near_clip();
    let z_far = far.max(z_near + MIN_EXTENT);
    let n = (z_near + (z_near * z_far).sqrt()) / sin_gamma;
    let f = n + depth;

    let eye = light_rotation.transform_point3(view.origin());
    let projection_center = Vec3::new(eye.x, min.y - n, eye.z);

    // Perspective along y: y' = ((f+n)y - 2fn) / ((f-n)y), w = y
    let warp = Mat4::from_cols(
        Vec4::X,
        Vec4::new(0.0, (f + n) / (f - n), 0.0, 1.0),
        Vec4::Z,
        Vec4::new(0.0, -2.0 * f * n / (f - n), 0.0, 0.0),
    );
    let light_space = warp * Mat4::from_translation(-projection_center) * light_rotation;

    let (warped_min, warped_max) =
        bounds(corners.iter().map(|&corner| light_space.project_point3(corner)));
    if !(warped_min.is_finite() && warped_max.is_finite()) {
        return None;
    }
    let warped_max = warped_max.max(warped_min + Vec3::splat(MIN_EXTENT));

    let fit = Mat4::orthographic_lh(
        warped_min.x, warped_max.x,
        warped_min.y, warped_max.y,
        warped_min.z, warped_max.z,
    );
    Some(fit * light_space)
}

fn bounds(points: impl Iterator<Item = Vec3>) -> (Vec3, Vec3) {
    points.fold(
        (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
        |(min, max), point| (min.min(point), max.max(point)),
    )
}

/// Clip space to shadow map texture space.
///
/// Maps x,y from [-1, 1] to [0, 1] with v pointing down. When the rendered
/// region of the shadow map is smaller than the texture, the result is
/// scaled down to that region. The region is anchored at the top-left texel,
/// matching the `(0, 0, usable, usable)` shadow pass viewport.
pub fn shadow_uv_transform(usable_size: u32, texture_size: Option<(u32, u32)>) -> Mat4 {
    let uv = Mat4::from_cols(
        Vec4::new(0.5, 0.0, 0.0, 0.0),
        Vec4::new(0.0, -0.5, 0.0, 0.0),
        Vec4::new(0.0, 0.0, 1.0, 0.0),
        Vec4::new(0.5, 0.5, 0.0, 1.0),
    );

    match texture_size {
        Some((width, height)) if width > 0 && height > 0 => {
            let scale = Vec3::new(
                usable_size as f32 / width as f32,
                usable_size as f32 / height as f32,
                1.0,
            );
            Mat4::from_scale(scale) * uv
        }
        _ => uv,
    }
}

#[cfg(test)]
#[path = "shadow_fit_tests.rs"]
mod tests;
