//! Tests for crop correction and camera-space projection


use face_overlay::anchors::{place, FaceMetrics, PlacementParams};
use face_overlay::accessories::Archetype;
use face_overlay::projection::LandmarkProjector;
use face_overlay::scene::Camera;
use face_overlay::tracking::Landmark;

fn projector(container: (u32, u32), video: Option<(u32, u32)>) -> LandmarkProjector {
    let camera = Camera::new(45.0, container.0 as f32 / container.1 as f32, 2.0);
    LandmarkProjector::new(container, video, &camera, 2.0, 0.3)
}

#[test]
fn test_taller_source_crops_vertically_only() {
    // 1920x1440 source (aspect 1.33) in a 1280x720 container (aspect 1.78)
    let p = projector((1280, 720), Some((1920, 1440)));
    assert!(p.crop_offset_y() > 0.0);
    assert_eq!(p.crop_offset_x(), 0.0);

    // Rendered height is width / video aspect = 1280 / (4/3) = 960,
    // so half the 240px overflow is cropped on each side
    assert!((p.crop_offset_y() - 120.0).abs() < 1e-3);
}

#[test]
fn test_wider_source_crops_horizontally_only() {
    let p = projector((1280, 720), Some((2560, 1080)));
    assert!(p.crop_offset_x() > 0.0);
    assert_eq!(p.crop_offset_y(), 0.0);
}

#[test]
fn test_world_coordinates_finite_and_continuous() {
    let configs = [
        ((1280, 720), Some((1920, 1080))),
        ((1280, 720), Some((1920, 1440))),
        ((720, 1280), Some((1920, 1080))),
        ((1280, 720), None),
    ];

    for (container, video) in configs {
        let p = projector(container, video);
        let mut prev: Option<nalgebra::Vector3<f32>> = None;

        for step in 0..=1000 {
            let t = step as f32 / 1000.0;
            let world = p.project_to_world(Landmark { x: t, y: 1.0 - t, z: -0.05 });
            assert!(
                world.x.is_finite() && world.y.is_finite() && world.z.is_finite(),
                "non-finite output at t={t} for {container:?}/{video:?}"
            );
            if let Some(prev) = prev {
                assert!(
                    (world - prev).norm() < 0.05,
                    "discontinuity at t={t} for {container:?}/{video:?}"
                );
            }
            prev = Some(world);
        }
    }
}

#[test]
fn test_glasses_base_scale_matches_eye_distance() {
    // eyeDistance 0.08 x glasses constant 1.5 = 0.12
    let p = projector((1280, 720), Some((1280, 720)));
    let frame = test_helpers::face_frame();
    let metrics = FaceMetrics::from_frame(&frame, &p).unwrap();
    assert!((metrics.eye_distance - 0.08).abs() < 1e-4);

    let params = PlacementParams::for_archetype(Archetype::Glasses).unwrap();
    let placement = place(&params, &metrics, &p);
    assert!((placement.base_scale - 0.12).abs() < 1e-4);
}

#[test]
fn test_crop_shifts_projected_coordinates() {
    // With a vertically-cropped source, a landmark at the video's vertical
    // center still maps to the viewport's vertical center, while one near
    // the top edge is pushed off-screen
    let p = projector((1280, 720), Some((1920, 1440)));

    let center = p.project(Landmark { x: 0.5, y: 0.5, z: 0.0 });
    assert!((center.v - 0.5).abs() < 1e-4);

    let top = p.project(Landmark { x: 0.5, y: 0.0, z: 0.0 });
    assert!(top.v < 0.0);
}

#[test]
fn test_depth_passes_through_scaled() {
    let p = projector((1280, 720), Some((1280, 720)));
    let world = p.project_to_world(Landmark { x: 0.5, y: 0.5, z: -0.1 });
    assert!((world.z - (-0.1 * 0.3)).abs() < 1e-6);
}
