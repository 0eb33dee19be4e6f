use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{DVec2, DVec3};
use opendrive_waypoint_engine::{
    ElevationProfile, GeoReference, GeometrySegment, Lane, LaneSection, LaneType, LaneTypeMask,
    Map, NetworkBuilder, Poly3, RecordIndex, Road, Waypoint,
};
use std::hint::black_box;

/// Synthetisches Gitter aus geraden Straßen (je 200 m, zwei Spuren).
fn build_synthetic_map(road_count: usize) -> Map {
    let mut builder = NetworkBuilder::new(GeoReference::default());
    for index in 0..road_count {
        let row = (index / 100) as f64;
        let column = (index % 100) as f64;
        let road = Road {
            id: (index as u64) + 1,
            length: 200.0,
            junction_id: None,
            segments: vec![GeometrySegment::Line {
                s0: 0.0,
                start: DVec2::new(column * 250.0, row * 50.0),
                heading: 0.0,
                length: 200.0,
            }],
            elevation: ElevationProfile::flat(),
            sections: vec![LaneSection::new(
                0.0,
                200.0,
                vec![
                    Lane::center(),
                    Lane::new(-1, LaneType::Driving, vec![Poly3::constant(0.0, 3.5)]),
                    Lane::new(1, LaneType::Driving, vec![Poly3::constant(0.0, 3.5)]),
                ],
            )],
            markings: RecordIndex::default(),
            speeds: RecordIndex::default(),
            signals: RecordIndex::default(),
        };
        builder.add_road(road);
    }
    Map::new(builder.finish().expect("Netzwerk muss valide sein"))
}

fn build_query_points(count: usize) -> Vec<DVec3> {
    (0..count)
        .map(|i| {
            let x = ((i * 37) % 25_000) as f64 + 0.37;
            let y = ((i * 7) % 500) as f64 + 0.63;
            DVec3::new(x, y, 0.0)
        })
        .collect()
}

fn bench_closest_waypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("closest_waypoint");

    for &road_count in &[100usize, 1_000usize] {
        let map = build_synthetic_map(road_count);
        let query_points = build_query_points(256);

        group.bench_with_input(
            BenchmarkId::new("locator_batch", road_count),
            &map,
            |b, map| {
                b.iter(|| {
                    let mut hits = 0usize;
                    for point in &query_points {
                        if map
                            .closest_waypoint_on_road(black_box(*point), LaneTypeMask::DRIVING)
                            .is_some()
                        {
                            hits += 1;
                        }
                    }
                    black_box(hits)
                })
            },
        );
    }
    group.finish();
}

fn bench_bulk_generation(c: &mut Criterion) {
    let map = build_synthetic_map(500);

    c.bench_function("generate_waypoints_2m", |b| {
        b.iter(|| {
            let wps = map.generate_waypoints(black_box(2.0)).expect("Abstand > 0");
            black_box(wps.len())
        })
    });

    c.bench_function("generate_topology", |b| {
        b.iter(|| black_box(map.generate_topology().len()))
    });
}

fn bench_transform_walk(c: &mut Criterion) {
    let map = build_synthetic_map(100);

    c.bench_function("transform_walk", |b| {
        b.iter(|| {
            let mut acc = 0.0f64;
            let mut s = 0.0;
            while s < 200.0 {
                let t = map
                    .compute_transform(black_box(Waypoint::new(1, -1, s)))
                    .expect("Waypoint ist valide");
                acc += t.position.x;
                s += 1.0;
            }
            black_box(acc)
        })
    });
}

criterion_group!(
    benches,
    bench_closest_waypoint,
    bench_bulk_generation,
    bench_transform_walk
);
criterion_main!(benches);
