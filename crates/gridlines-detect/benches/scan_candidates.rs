use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use gridlines_core::SampleGrid;
use gridlines_detect::{
    binarize, scan_candidates, Axis, BinaryMask, GridDetector, GridDetectorParams, ScanParams,
};

fn ruled_paper(size: usize, pitch: usize) -> SampleGrid {
    let on_rule = |v: usize| v % pitch < 2;
    SampleGrid::from_fn(size, size, 1, |x, y, _| {
        if on_rule(x) || on_rule(y) {
            0.1
        } else {
            0.9
        }
    })
    .expect("valid image")
}

fn paper_mask(size: usize, pitch: usize) -> BinaryMask {
    binarize(&ruled_paper(size, pitch), 1000).0
}

fn bench_scan(c: &mut Criterion) {
    let mask = paper_mask(160, 20);
    let params = ScanParams::default();
    c.bench_function("scan_candidates_vertical_160x160", |b| {
        b.iter(|| black_box(scan_candidates(black_box(&mask), Axis::Vertical, &params)));
    });
}

fn bench_detect(c: &mut Criterion) {
    let image = ruled_paper(160, 20);
    let detector = GridDetector::new(GridDetectorParams::default()).expect("default params");
    c.bench_function("detect_160x160", |b| {
        b.iter(|| black_box(detector.detect(black_box(&image))));
    });
}

criterion_group!(benches, bench_scan, bench_detect);
criterion_main!(benches);
