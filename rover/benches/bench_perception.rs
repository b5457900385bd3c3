//! # Perception Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use image::{Rgb, RgbImage};
use rov_lib::{
    auto::{
        map::WorldMapParams,
        per::{
            transform::{warp_to_top_down, Homography},
            PerMgr, PerParams,
        },
    },
    rover_state::RoverState,
};

fn perception_benchmark(c: &mut Criterion) {
    // ---- Build a dummy frame ----

    // Sky and rock in the top half, bright ground below with a sample near the centre
    let frame = RgbImage::from_fn(320, 160, |x, y| {
        if y < 80 {
            Rgb([70, 50, 40])
        } else if (150..170).contains(&x) && (120..130).contains(&y) {
            Rgb([200, 180, 20])
        } else {
            Rgb([190, 170, 165])
        }
    });

    let params = PerParams::default();
    let homography = Homography::from_quads(&params.calib_src_px, &params.calib_dst_px()).unwrap();
    let per_mgr = PerMgr::new(params.clone()).unwrap();
    let mut state = RoverState::new(&WorldMapParams::default(), (320, 160));
    state.telem.position_m = [100.0, 100.0];

    c.bench_function("warp_to_top_down", |b| {
        b.iter(|| warp_to_top_down(&frame, &homography))
    });

    let warped = warp_to_top_down(&frame, &homography);
    c.bench_function("ClassifierParams::classify", |b| {
        b.iter(|| params.classifier.classify(&warped))
    });

    c.bench_function("PerMgr::step", |b| b.iter(|| per_mgr.step(&frame, &mut state)));
}

criterion_group!(benches, perception_benchmark);
criterion_main!(benches);
