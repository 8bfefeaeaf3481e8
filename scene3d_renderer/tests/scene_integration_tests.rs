//! Integration tests for GraphicsScene frames
//!
//! Drives whole frames through the public API with a counting device.
//! No GPU required.
//!
//! Run with: cargo test --test scene_integration_tests


use std::sync::Arc;
use glam::{Mat4, Vec3};
use scene3d_renderer::scene3d::camera::BoundingSphere;
use scene3d_renderer::scene3d::device::Surface;
use scene3d_renderer::scene3d::scene::{ObjectId, RenderPassStage, SubMeshId, ViewId};
use scene3d_renderer::scene3d::{GraphicsConfig, GraphicsScene, ShadowFitMode, ShadowMode};
use test_device::{
    test_material, CountingDevice, TestBuffer, TestRenderContext, TestResources, TestSurface,
    TestVertexDescription,
};

// ============================================================================
// HELPERS
// ============================================================================

fn add_view(scene: &mut GraphicsScene, origin: Vec3, forward: Vec3) -> ViewId {
    let view = scene.allocate_view();
    scene.set_view_transform(view, origin, forward, Vec3::Y);
    scene.set_view_viewport(view, 0, 0, 640, 360);
    let depth: Arc<dyn Surface> = Arc::new(TestSurface);
    let v = scene.view_mut(view).unwrap();
    v.set_aspect_ratio(16.0 / 9.0);
    v.set_render_context(Some(Arc::new(TestRenderContext)));
    v.set_depth_stencil_surface(Some(depth));
    view
}

fn add_static(scene: &mut GraphicsScene, center: Vec3, sub_mesh_count: u32) -> (ObjectId, Vec<SubMeshId>) {
    let object = scene.allocate_object();
    let o = scene.object_mut(object).unwrap();
    o.set_transform(Mat4::from_translation(center));
    o.set_world_bounds(BoundingSphere::new(center, 1.5));
    o.set_vertex_data(Some(Arc::new(TestBuffer)), Some(Arc::new(TestVertexDescription)), 44);
    o.set_index_buffer(Some(Arc::new(TestBuffer)));

    let material = test_material(1, 2);
    let sub_meshes = (0..sub_mesh_count)
        .map(|i| {
            let sub_mesh = scene.allocate_sub_mesh(object).unwrap();
            let s = scene.sub_mesh_mut(sub_mesh).unwrap();
            s.set_primitive_count(100);
            s.set_start_index(i * 300);
            s.set_material(Some(material.clone()));
            sub_mesh
        })
        .collect();
    (object, sub_meshes)
}

fn add_skinned(scene: &mut GraphicsScene, center: Vec3, bone_count: u8) -> (ObjectId, SubMeshId) {
    let (object, sub_meshes) = add_static(scene, center, 1);
    let palette: Vec<Mat4> = (0..bone_count).map(|_| Mat4::from_translation(center)).collect();
    scene.object_mut(object).unwrap().set_bone_data(Some(palette.into()), bone_count);
    let map: Vec<u8> = (0..bone_count).collect();
    scene.sub_mesh_mut(sub_meshes[0]).unwrap().set_skinning_palette_map(Some(map.into()));
    (object, sub_meshes[0])
}

// ============================================================================
// FRAME TESTS
// ============================================================================

#[test]
fn test_integration_full_frame() {
    let mut scene = GraphicsScene::new(GraphicsConfig::default());
    add_view(&mut scene, Vec3::new(0.0, 2.0, -10.0), Vec3::Z);
    add_static(&mut scene, Vec3::new(0.0, 0.0, 5.0), 2);
    add_skinned(&mut scene, Vec3::new(3.0, 0.0, 8.0), 4);
    scene.set_directional_light(Vec3::new(1.0, -2.0, 0.5), Vec3::ONE, 2.0);

    let mut device = CountingDevice::new();
    let resources = TestResources::new();
    scene.update(&mut device, &resources);

    let stats = scene.last_frame_stats();
    assert_eq!(stats.views_drawn, 1);
    assert_eq!(stats.visible_sub_meshes, 3);
    assert_eq!(stats.constant_data.static_blocks, 1);
    assert_eq!(stats.constant_data.skinned_blocks, 1);
    for stage in [RenderPassStage::ShadowDepth, RenderPassStage::DepthPrePass, RenderPassStage::BasePass] {
        assert_eq!(stats.draw_calls(stage), 3, "{} draw calls", stage.name());
    }
    assert_eq!(device.count("draw_indexed"), 9);
    assert_eq!(device.count("begin_scene"), device.count("end_scene"));
    assert_eq!(device.quads.quads, 1);
    assert_eq!(device.quads.flushes, 1);
}

#[test]
fn test_integration_two_views_share_instance_blocks() {
    let mut scene = GraphicsScene::new(GraphicsConfig::default());
    add_view(&mut scene, Vec3::new(0.0, 0.0, -10.0), Vec3::Z);
    add_view(&mut scene, Vec3::new(10.0, 0.0, 0.0), Vec3::NEG_X);
    add_static(&mut scene, Vec3::ZERO, 1);

    let mut device = CountingDevice::new();
    scene.update(&mut device, &TestResources::new());

    let stats = scene.last_frame_stats();
    assert_eq!(stats.views_drawn, 2);
    assert_eq!(stats.visible_sub_meshes, 2);
    assert_eq!(device.buffer_count("view_global"), 2);
    assert_eq!(device.buffer_count("static_instance"), 1);
    assert_eq!(device.quads.quads, 2);
}

#[test]
fn test_integration_steady_state_allocates_nothing() {
    let config = GraphicsConfig { buffer_set_count: 3, ..Default::default() };
    let mut scene = GraphicsScene::new(config);
    add_view(&mut scene, Vec3::new(0.0, 0.0, -10.0), Vec3::Z);
    add_static(&mut scene, Vec3::ZERO, 2);
    add_skinned(&mut scene, Vec3::new(1.0, 0.0, 0.0), 8);

    let mut device = CountingDevice::new();
    let resources = TestResources::new();
    for _ in 0..3 {
        scene.update(&mut device, &resources);
    }
    let created = device.buffers.len();
    for _ in 0..9 {
        scene.update(&mut device, &resources);
    }
    assert_eq!(device.buffers.len(), created);
}

#[test]
fn test_integration_shadows_disabled() {
    let config = GraphicsConfig { shadow_mode: ShadowMode::None, ..Default::default() };
    let mut scene = GraphicsScene::new(config);
    add_view(&mut scene, Vec3::new(0.0, 0.0, -10.0), Vec3::Z);
    add_static(&mut scene, Vec3::ZERO, 1);

    let mut device = CountingDevice::new();
    scene.update(&mut device, &TestResources::new());

    assert_eq!(scene.last_frame_stats().draw_calls(RenderPassStage::ShadowDepth), 0);
    assert_eq!(device.buffer_count("shadow_view"), 0);
    assert_eq!(device.count("draw_indexed"), 2);
}

#[test]
fn test_integration_perspective_shadow_fit() {
    let config = GraphicsConfig {
        shadow_mode: ShadowMode::PcfDithered,
        shadow_fit: ShadowFitMode::LightSpacePerspective,
        ..Default::default()
    };
    let mut scene = GraphicsScene::new(config);
    let view = add_view(&mut scene, Vec3::new(0.0, 5.0, -10.0), Vec3::new(0.0, -0.3, 1.0));
    scene.view_mut(view).unwrap().set_shadow_cutoff_distance(80.0);
    add_static(&mut scene, Vec3::ZERO, 1);
    scene.set_directional_light(Vec3::new(1.0, -1.0, 0.0), Vec3::ONE, 1.0);

    let mut device = CountingDevice::new();
    scene.update(&mut device, &TestResources::new());

    let matrix = scene.shadow_view_projection(view).unwrap();
    assert!(matrix.is_finite());
    assert_eq!(scene.last_frame_stats().draw_calls(RenderPassStage::ShadowDepth), 1);
}

#[test]
fn test_integration_release_during_session() {
    let mut scene = GraphicsScene::new(GraphicsConfig::default());
    let view = add_view(&mut scene, Vec3::new(0.0, 0.0, -10.0), Vec3::Z);
    let (first, _) = add_static(&mut scene, Vec3::ZERO, 1);
    add_static(&mut scene, Vec3::new(1.0, 0.0, 0.0), 1);

    let mut device = CountingDevice::new();
    let resources = TestResources::new();
    scene.update(&mut device, &resources);
    assert_eq!(scene.last_frame_stats().visible_sub_meshes, 2);

    scene.release_object(first);
    scene.update(&mut device, &resources);
    assert_eq!(scene.last_frame_stats().visible_sub_meshes, 1);

    scene.release_view(view);
    scene.update(&mut device, &resources);
    assert_eq!(scene.last_frame_stats().views_drawn, 0);
}
