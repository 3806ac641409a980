//! Benchmarks for projection and rig updates

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fishtank_stereo::{
    filters::{FilterBank, FilterKind, Position},
    estimator::PositionEstimator,
    projection::{generalized_perspective, off_axis_projection, symmetric_perspective},
    projection_plane::ProjectionPlane,
    stereo_rig::{EyeCamera, Pose, StereoRig},
    tracking::TrackingPipeline,
};
use nalgebra::{Point3, UnitQuaternion};

fn screen() -> ProjectionPlane {
    ProjectionPlane::from_center_size(Point3::origin(), 0.53, 0.3).unwrap()
}

fn benchmark_projection(c: &mut Criterion) {
    let plane = screen();
    let eye = Point3::new(0.05, -0.02, 0.6);

    c.bench_function("off_axis_projection", |b| {
        b.iter(|| black_box(off_axis_projection(black_box(&eye), &plane, 0.01, 1000.0)));
    });

    c.bench_function("generalized_perspective", |b| {
        b.iter(|| black_box(generalized_perspective(black_box(&eye), &plane, 0.01, 1000.0)));
    });

    c.bench_function("symmetric_perspective", |b| {
        b.iter(|| black_box(symmetric_perspective(black_box(1.0), 16.0 / 9.0, 0.01, 1000.0)));
    });
}

fn benchmark_rig_update(c: &mut Criterion) {
    let eye = EyeCamera::default();
    let mut rig = StereoRig::new(0.064, eye, eye).unwrap().with_plane(screen());
    let poses: Vec<Pose> = (0..100)
        .map(|i| {
            let t = i as f64 / 60.0;
            Pose::new(
                Point3::new(0.1 * t.sin(), 0.02 * t.cos(), 0.6 + 0.05 * rand::random::<f64>()),
                UnitQuaternion::from_euler_angles(0.0, 0.05 * t.sin(), 0.0),
            )
        })
        .collect();

    c.bench_function("stereo_rig_update_100", |b| {
        b.iter(|| {
            for pose in &poses {
                black_box(rig.update(black_box(pose)));
            }
        });
    });
}

fn benchmark_pipeline_tick(c: &mut Criterion) {
    let eye = EyeCamera::default();
    let rig = StereoRig::new(0.064, eye, eye).unwrap().with_plane(screen());
    let filters = FilterBank::with_defaults(FilterKind::OneEuro).unwrap();
    let mut pipeline = TrackingPipeline::new(PositionEstimator::default(), filters, rig);

    let samples: Vec<Position> = (0..100)
        .map(|_| {
            Position::new(
                0.01 * rand::random::<f64>(),
                0.01 * rand::random::<f64>(),
                0.6 + 0.01 * rand::random::<f64>(),
            )
        })
        .collect();

    c.bench_function("pipeline_tick_100", |b| {
        b.iter(|| {
            for &sample in &samples {
                black_box(pipeline.tick(black_box(Some(sample))));
            }
        });
    });
}

criterion_group!(benches, benchmark_projection, benchmark_rig_update, benchmark_pipeline_tick);
criterion_main!(benches);
