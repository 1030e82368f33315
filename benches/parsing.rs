//! Benchmarks for markdown parsing and preview layout.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use inkdown::document::{Document, RenderOptions, parse_blocks};
use inkdown::sample::SAMPLE_DOCUMENT;

fn large_document() -> String {
    SAMPLE_DOCUMENT.repeat(20)
}

fn bench_parse_blocks(c: &mut Criterion) {
    let source = large_document();
    c.bench_function("parse_blocks_large", |b| {
        b.iter(|| parse_blocks(black_box(&source), RenderOptions::default()));
    });
}

fn bench_render_sample(c: &mut Criterion) {
    c.bench_function("render_sample_80_cols", |b| {
        b.iter(|| Document::render(black_box(SAMPLE_DOCUMENT), 80, RenderOptions::default()));
    });
}

fn bench_render_keystroke_cadence(c: &mut Criterion) {
    // Every keystroke re-renders the whole document; this is the latency
    // budget that matters for typing feel.
    let source = large_document();
    c.bench_function("render_large_per_keystroke", |b| {
        b.iter(|| Document::render(black_box(&source), 60, RenderOptions::default()));
    });
}

criterion_group!(
    benches,
    bench_parse_blocks,
    bench_render_sample,
    bench_render_keystroke_cadence
);
criterion_main!(benches);
