//! Benchmarks for the reader core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use flipbook_reader::layout::FontMetrics;
use flipbook_reader::{
    measure, paginate, BlockId, BlockMetrics, CanonicalContent, HeadlessDisplay, Reader,
    ReaderConfig, Viewport,
};

fn long_post(paragraphs: usize) -> CanonicalContent {
    CanonicalContent::from_html_blocks((0..paragraphs).map(|i| {
        format!(
            "<p>Paragraph {i} contains enough text to span multiple lines and test the \
             line breaking used for measurement. <em>Some</em> of it is marked up.</p>"
        )
    }))
}

fn bench_paginate(c: &mut Criterion) {
    let metrics: Vec<BlockMetrics> = (0..1000)
        .map(|i| BlockMetrics::new(BlockId(i), 40.0 + (i % 17) as f32 * 23.0, 24.0))
        .collect();

    c.bench_function("paginate_1000_blocks", |b| {
        b.iter(|| black_box(paginate(black_box(&metrics), 663.0)));
    });
}

fn bench_measure_text(c: &mut Criterion) {
    let content = long_post(200);
    let mut display = HeadlessDisplay::new(FontMetrics::default(), 24.0);

    c.bench_function("measure_200_paragraphs", |b| {
        b.iter(|| black_box(measure(&mut display, &content, 388.0).unwrap()));
    });
}

fn bench_activate(c: &mut Criterion) {
    c.bench_function("activate_100_paragraphs", |b| {
        b.iter(|| {
            let reader = Reader::activate(
                ReaderConfig::default(),
                long_post(100),
                Viewport::new(1280.0, 900.0),
                HeadlessDisplay::default(),
            )
            .unwrap();
            black_box(reader.pages().len())
        });
    });
}

fn bench_page_through(c: &mut Criterion) {
    c.bench_function("page_through_reduced_motion", |b| {
        let viewport = Viewport::new(1280.0, 900.0).with_reduced_motion(true);
        let mut reader = Reader::activate(
            ReaderConfig::default(),
            long_post(100),
            viewport,
            HeadlessDisplay::default(),
        )
        .unwrap();
        let last = reader.pages().last_index();

        b.iter(|| {
            for _ in 0..last {
                reader.go_to_next_page();
            }
            for _ in 0..last {
                reader.go_to_prev_page();
            }
        });
    });
}

fn bench_resize(c: &mut Criterion) {
    c.bench_function("resize_spread_to_single", |b| {
        let mut reader = Reader::activate(
            ReaderConfig::default(),
            long_post(100),
            Viewport::new(1280.0, 900.0),
            HeadlessDisplay::default(),
        )
        .unwrap();
        let mut narrow = false;

        b.iter(|| {
            narrow = !narrow;
            let width = if narrow { 600.0 } else { 1280.0 };
            reader.resize(Viewport::new(width, 900.0)).unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_paginate,
    bench_measure_text,
    bench_activate,
    bench_page_through,
    bench_resize,
);

criterion_main!(benches);
