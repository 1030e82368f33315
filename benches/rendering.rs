//! Benchmarks for the export renderers.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use inkdown::document::{Document, RenderOptions};
use inkdown::export::html::to_html;
use inkdown::sample::SAMPLE_DOCUMENT;

fn bench_html_export(c: &mut Criterion) {
    let doc = Document::render(SAMPLE_DOCUMENT, 80, RenderOptions::default());
    c.bench_function("html_export_sample", |b| {
        b.iter(|| to_html(black_box(&doc)));
    });
}

fn bench_plain_text(c: &mut Criterion) {
    let doc = Document::render(&SAMPLE_DOCUMENT.repeat(20), 80, RenderOptions::default());
    c.bench_function("plain_text_large", |b| {
        b.iter(|| black_box(&doc).plain_text());
    });
}

criterion_group!(benches, bench_html_export, bench_plain_text);
criterion_main!(benches);
