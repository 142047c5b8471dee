use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::DVec3;

use place_globe::config::{PointConfig, RingConfig};
use place_globe::map::TerminalGlobe;
use place_globe::places::sample_places;
use place_globe::scene::occlusion::segment_hits_sphere;
use place_globe::scene::renderer::GlobeRenderer;
use place_globe::scene::sync::{derive_points, derive_rings, RingPolicy, RingStyle, VisualTable};

fn bench_occlusion(c: &mut Criterion) {
    let camera = DVec3::new(-250.0, 10.0, 30.0);
    let body = DVec3::new(6030.0, 0.0, 0.0);
    c.bench_function("segment_hits_sphere", |b| {
        b.iter(|| segment_hits_sphere(black_box(camera), black_box(body), black_box(100.0)))
    });
}

fn bench_derive_points(c: &mut Criterion) {
    let places: Vec<_> = (0..50).flat_map(|_| sample_places()).collect();
    c.bench_function("derive_points_250", |b| {
        b.iter(|| {
            let points = derive_points(black_box(&places), Some("kotelniki-2023-08-01"), Some("norilsk-1996-03-01"));
            derive_rings(&points, RingPolicy::All)
        })
    });
}

fn bench_frame_render(c: &mut Criterion) {
    let mut globe = TerminalGlobe::new();
    globe.set_imagery(&Default::default());
    globe.set_size(240, 200);
    let table = VisualTable::new(&PointConfig::default());
    let points = derive_points(&sample_places(), Some("kotelniki-2023-08-01"), None);
    globe.set_points(&points, &table);
    globe.set_rings(&points, &RingStyle::new(&RingConfig::default(), table));

    c.bench_function("terminal_frame_render", |b| b.iter(|| black_box(globe.render())));
}

criterion_group!(benches, bench_occlusion, bench_derive_points, bench_frame_render);
criterion_main!(benches);
