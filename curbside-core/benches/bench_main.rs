use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use curbside_core::geometry::LocalFrame;
use curbside_core::{
    DEFAULT_COINCIDENCE_TOLERANCE_M, DEFAULT_GUIDE_OFFSET_M, GuideSnap, LatLng, Polyline,
    RoadFeature, StudyArea, build_guides, find_path,
};
use geo::Coord;

const BLOCK_M: f64 = 80.0;
const BLOCKS: usize = 12;

fn frame() -> LocalFrame {
    LocalFrame::new(LatLng::new(48.137, 11.575))
}

fn at(x: f64, y: f64) -> LatLng {
    frame().to_lat_lng(Coord { x, y })
}

/// Street grid with a road along every block edge
fn grid_roads() -> Vec<RoadFeature> {
    let extent = BLOCK_M * BLOCKS as f64;
    let mut roads = Vec::new();
    for i in 0..=BLOCKS {
        let d = BLOCK_M * i as f64;
        roads.push(RoadFeature::new(
            format!("way/h{i}"),
            Polyline::new(vec![at(-10.0, d), at(extent + 10.0, d)]),
        ));
        roads.push(RoadFeature::new(
            format!("way/v{i}"),
            Polyline::new(vec![at(d, -10.0), at(d, extent + 10.0)]),
        ));
    }
    roads
}

fn study_area() -> StudyArea {
    let extent = BLOCK_M * BLOCKS as f64;
    StudyArea::new(vec![
        at(-5.0, -5.0),
        at(extent + 5.0, -5.0),
        at(extent + 5.0, extent + 5.0),
        at(-5.0, extent + 5.0),
    ])
    .expect("valid study area")
}

fn bench_guides(c: &mut Criterion) {
    let roads = grid_roads();
    let area = study_area();
    c.bench_function("build_guides_grid", |b| {
        b.iter(|| build_guides(black_box(&roads), black_box(&area), DEFAULT_GUIDE_OFFSET_M));
    });
}

fn bench_routing(c: &mut Criterion) {
    let guides = build_guides(&grid_roads(), &study_area(), DEFAULT_GUIDE_OFFSET_M);
    let first = &guides[0];
    let last = &guides[guides.len() - 1];
    let start = GuideSnap {
        guide: first.id,
        point: first.geometry.first().expect("guide has points"),
    };
    let end = GuideSnap {
        guide: last.id,
        point: last.geometry.last().expect("guide has points"),
    };
    c.bench_function("find_path_grid", |b| {
        b.iter(|| {
            find_path(
                black_box(&guides),
                black_box(&start),
                black_box(&end),
                DEFAULT_COINCIDENCE_TOLERANCE_M,
            )
        });
    });
}

criterion_group!(benches, bench_guides, bench_routing);
criterion_main!(benches);
