//! Camera module: scene views, frusta and bounding volumes.
//!
//! A SceneView owns its camera parameters and derives its matrices and
//! frustum lazily. Frustum and BoundingSphere are the visibility primitives.

mod bounding_sphere;
mod frustum;
mod scene_view;

pub use bounding_sphere::BoundingSphere;
pub use frustum::{
    Frustum,
    CORNER_COUNT,
    PLANE_LEFT, PLANE_RIGHT, PLANE_BOTTOM, PLANE_TOP, PLANE_NEAR, PLANE_FAR,
};
pub use scene_view::SceneView;
