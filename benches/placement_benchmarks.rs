//! Benchmarks for the per-frame placement math

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use face_overlay::accessories::Archetype;
use face_overlay::anchors::{place, FaceMetrics, PlacementParams};
use face_overlay::app::OverlayApp;
use face_overlay::assets::SyntheticLoader;
use face_overlay::config::Config;
use face_overlay::constants::{
    CHIN, FOREHEAD_TOP, LEFT_EYE_OUTER, LOWER_LIP, MIN_FACE_LANDMARKS, NOSE_TIP, RIGHT_EYE_OUTER,
    UPPER_LIP,
};
use face_overlay::projection::LandmarkProjector;
use face_overlay::scene::{Camera, NullRenderer};
use face_overlay::tracking::{HeadRotation, Landmark, TrackedFrame};

fn face_frame() -> TrackedFrame {
    let mut landmarks: Vec<Landmark> = (0..MIN_FACE_LANDMARKS)
        .map(|i| {
            let t = i as f32 / MIN_FACE_LANDMARKS as f32;
            Landmark {
                x: 0.35 + 0.3 * t,
                y: 0.30 + 0.4 * (t * 6.283).sin().abs(),
                z: -0.05 * t,
            }
        })
        .collect();
    landmarks[LEFT_EYE_OUTER] = Landmark { x: 0.46, y: 0.45, z: -0.02 };
    landmarks[RIGHT_EYE_OUTER] = Landmark { x: 0.54, y: 0.44, z: -0.02 };
    landmarks[NOSE_TIP] = Landmark { x: 0.5, y: 0.5, z: -0.05 };
    landmarks[UPPER_LIP] = Landmark { x: 0.5, y: 0.56, z: -0.01 };
    landmarks[LOWER_LIP] = Landmark { x: 0.5, y: 0.58, z: -0.01 };
    landmarks[CHIN] = Landmark { x: 0.5, y: 0.65, z: -0.01 };
    landmarks[FOREHEAD_TOP] = Landmark { x: 0.5, y: 0.35, z: -0.02 };
    TrackedFrame {
        landmarks,
        rotation: Some(HeadRotation { x: 0.1, y: -0.05, z: 0.02 }),
        video_size: Some((1920, 1080)),
        ..TrackedFrame::default()
    }
}

fn projector() -> LandmarkProjector {
    let camera = Camera::new(45.0, 1280.0 / 720.0, 2.0);
    LandmarkProjector::new((1280, 720), Some((1920, 1080)), &camera, 2.0, 0.3)
}

fn benchmark_projection(c: &mut Criterion) {
    let projector = projector();
    let frame = face_frame();

    c.bench_function("project_full_landmark_set", |b| {
        b.iter(|| {
            for &lm in &frame.landmarks {
                black_box(projector.project_to_world(black_box(lm)));
            }
        });
    });
}

fn benchmark_placement(c: &mut Criterion) {
    let projector = projector();
    let frame = face_frame();
    let archetypes = [
        Archetype::Glasses,
        Archetype::FacialHair,
        Archetype::Mask,
        Archetype::Hat,
        Archetype::Hair,
        Archetype::Clothing,
    ];

    c.bench_function("face_metrics", |b| {
        b.iter(|| black_box(FaceMetrics::from_frame(black_box(&frame), &projector)));
    });

    c.bench_function("place_all_archetypes", |b| {
        let metrics = FaceMetrics::from_frame(&frame, &projector).unwrap();
        b.iter(|| {
            for archetype in archetypes {
                let params = PlacementParams::for_archetype(archetype).unwrap();
                black_box(place(&params, &metrics, &projector));
            }
        });
    });
}

fn benchmark_full_tick(c: &mut Criterion) {
    let mut app = OverlayApp::with_builtin_manifest(
        Config::default(),
        SyntheticLoader::new(),
        NullRenderer::default(),
        (1280, 720),
    )
    .unwrap();
    for id in ["glasses", "mustache", "cap", "tshirt", "avatar"] {
        app.toggle_accessory(id).unwrap();
    }
    let frame = face_frame();
    // Settle loads before measuring
    app.tick(Some(&frame));

    c.bench_function("tick_five_active_objects", |b| {
        b.iter(|| app.tick(Some(black_box(&frame))));
    });

    let empty = TrackedFrame::default();
    c.bench_function("tick_no_subject", |b| {
        b.iter(|| app.tick(Some(black_box(&empty))));
    });
}

criterion_group!(
    benches,
    benchmark_projection,
    benchmark_placement,
    benchmark_full_tick
);
criterion_main!(benches);
