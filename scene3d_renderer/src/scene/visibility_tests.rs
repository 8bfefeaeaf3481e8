use glam::{Mat4, Vec3};
use super::*;
use crate::scene::{SceneObject, SubMeshData};

/// Camera at the origin looking down +Z, 90° vertical FOV, near 1, far 100
fn frustum() -> Frustum {
    let projection = Mat4::perspective_lh(std::f32::consts::FRAC_PI_2, 1.0, 1.0, 100.0);
    let view = Mat4::look_to_lh(Vec3::ZERO, Vec3::Z, Vec3::Y);
    Frustum::from_view_projection(&(projection * view))
}

fn object_at(center: Vec3, radius: f32) -> SceneObject {
    let mut object = SceneObject::new();
    object.set_transform(Mat4::from_translation(center));
    object.set_world_bounds(BoundingSphere::new(center, radius));
    object
}

fn add_sub_mesh(sub_meshes: &mut SubMeshPool, object: ObjectId) -> SubMeshId {
    sub_meshes.insert(SubMeshData::new(object))
}

// ============================================================================
// Sphere culling
// ============================================================================

#[test]
fn test_sphere_inside_is_visible() {
    assert!(sphere_visible(&frustum(), &BoundingSphere::new(Vec3::new(0.0, 0.0, 50.0), 1.0)));
}

#[test]
fn test_sphere_behind_camera_is_culled() {
    assert!(!sphere_visible(&frustum(), &BoundingSphere::new(Vec3::new(0.0, 0.0, -10.0), 1.0)));
}

#[test]
fn test_sphere_straddling_plane_is_visible() {
    // Center just outside the right plane (x = z), radius reaches back inside
    let sphere = BoundingSphere::new(Vec3::new(11.0, 0.0, 10.0), 2.0);
    assert!(sphere_visible(&frustum(), &sphere));
}

#[test]
fn test_sphere_beyond_far_is_culled() {
    assert!(!sphere_visible(&frustum(), &BoundingSphere::new(Vec3::new(0.0, 0.0, 110.0), 5.0)));
}

#[test]
fn test_degenerate_sphere_is_visible() {
    let f = frustum();
    assert!(sphere_visible(&f, &BoundingSphere::new(Vec3::new(0.0, 0.0, -500.0), 0.0)));
    assert!(sphere_visible(&f, &BoundingSphere::new(Vec3::new(0.0, 0.0, -500.0), -1.0)));
    assert!(sphere_visible(&f, &BoundingSphere::new(Vec3::new(f32::NAN, 0.0, 0.0), 1.0)));
    assert!(sphere_visible(&f, &BoundingSphere::new(Vec3::ZERO, f32::INFINITY)));
}

// ============================================================================
// VisibilityStage
// ============================================================================

#[test]
fn test_visible_set_sized_to_pool_capacity() {
    let mut objects = ObjectPool::new();
    let sub_meshes = SubMeshPool::new();
    let a = objects.insert(object_at(Vec3::new(0.0, 0.0, 20.0), 1.0));
    objects.insert(object_at(Vec3::new(0.0, 0.0, -20.0), 1.0));
    objects.insert(object_at(Vec3::new(0.0, 0.0, 30.0), 1.0));
    objects.release(a);

    let mut stage = VisibilityStage::new();
    stage.compute_visibility(&frustum(), &objects, &sub_meshes);

    assert_eq!(stage.visible_objects().len(), 3);
    let visible: Vec<usize> = stage.visible_objects().iter_ones().collect();
    assert_eq!(visible, vec![2]);
}

#[test]
fn test_sub_meshes_follow_owner_visibility() {
    let mut objects = ObjectPool::new();
    let mut sub_meshes = SubMeshPool::new();
    let front = objects.insert(object_at(Vec3::new(0.0, 0.0, 20.0), 1.0));
    let behind = objects.insert(object_at(Vec3::new(0.0, 0.0, -20.0), 1.0));

    let front_a = add_sub_mesh(&mut sub_meshes, front);
    let _behind_a = add_sub_mesh(&mut sub_meshes, behind);
    let front_b = add_sub_mesh(&mut sub_meshes, front);

    let mut stage = VisibilityStage::new();
    let visible = stage.compute_visibility(&frustum(), &objects, &sub_meshes).to_vec();
    assert_eq!(visible, vec![front_a, front_b]);
    assert!(stage.is_object_visible(front));
    assert!(!stage.is_object_visible(behind));
}

#[test]
fn test_recompute_clears_previous_frame() {
    let mut objects = ObjectPool::new();
    let mut sub_meshes = SubMeshPool::new();
    let a = objects.insert(object_at(Vec3::new(0.0, 0.0, 20.0), 1.0));
    add_sub_mesh(&mut sub_meshes, a);

    let mut stage = VisibilityStage::new();
    assert_eq!(stage.compute_visibility(&frustum(), &objects, &sub_meshes).len(), 1);

    if let Some(object) = objects.get_mut(a) {
        *object = object_at(Vec3::new(0.0, 0.0, -20.0), 1.0);
    }
    assert!(stage.compute_visibility(&frustum(), &objects, &sub_meshes).is_empty());
    assert_eq!(stage.visible_objects().count_ones(), 0);
}

#[test]
fn test_released_sub_mesh_not_collected() {
    let mut objects = ObjectPool::new();
    let mut sub_meshes = SubMeshPool::new();
    let a = objects.insert(object_at(Vec3::new(0.0, 0.0, 20.0), 1.0));
    let s0 = add_sub_mesh(&mut sub_meshes, a);
    let s1 = add_sub_mesh(&mut sub_meshes, a);
    sub_meshes.release(s0);

    let mut stage = VisibilityStage::new();
    assert_eq!(stage.compute_visibility(&frustum(), &objects, &sub_meshes), &[s1]);
}
