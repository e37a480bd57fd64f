use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fleet_core::{
    hit_test, EquipmentSnapshot, FeatureLayer, FleetMapConfig, GeoPoint, Pixel, StateCatalog,
    Viewport,
};

fn fleet(size: usize) -> Vec<Arc<EquipmentSnapshot>> {
    let config = FleetMapConfig::default();
    (0..size)
        .map(|index| {
            let state = &config.states[index % config.states.len()];
            let step = index as f64 * 0.01;
            Arc::new(EquipmentSnapshot {
                equipment_id: format!("eq-{index}"),
                state_id: state.id.clone(),
                position: GeoPoint::new(-22.9 + step, -43.2 - step),
                name: format!("CA-{index:04}"),
                model_name: None,
            })
        })
        .collect()
}

fn bench_hit_test(c: &mut Criterion) {
    let config = FleetMapConfig::default();
    let catalog = StateCatalog::from_config(&config);
    let viewport = Viewport::centered_on(GeoPoint::new(-22.9, -43.2), 8.0, 1024.0, 768.0);
    let mut group = c.benchmark_group("hit_test");

    for size in [10usize, 100, 500, 2000] {
        let snapshots = fleet(size);
        let layer = FeatureLayer::build(&snapshots, &catalog, &config.point_style);
        group.bench_with_input(BenchmarkId::new("features", size), &layer, |b, layer| {
            b.iter(|| {
                hit_test(
                    layer.features(),
                    &viewport,
                    black_box(Pixel::new(512.0, 384.0)),
                    0.0,
                )
            })
        });
    }

    group.finish();
}

fn bench_layer_build(c: &mut Criterion) {
    let config = FleetMapConfig::default();
    let catalog = StateCatalog::from_config(&config);
    let mut group = c.benchmark_group("feature_layer");

    for size in [10usize, 100, 500, 2000] {
        let snapshots = fleet(size);
        group.bench_with_input(BenchmarkId::new("build", size), &snapshots, |b, snapshots| {
            b.iter(|| FeatureLayer::build(snapshots, &catalog, &config.point_style))
        });
    }

    group.finish();
}

criterion_group!(interaction_benches, bench_hit_test, bench_layer_build);
criterion_main!(interaction_benches);
