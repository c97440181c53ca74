//! Benchmarks for the rewrite pipeline.
//!
//! Run with: cargo bench

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use scoperem::{RewriteOptions, Rewriter, Stylesheet, ToCss, compute_scale};

/// A synthetic sheet with a mix of convertible and untouched values.
fn sample_css(rules: usize) -> String {
    let mut css = String::new();
    for i in 0..rules {
        css.push_str(&format!(
            ".card-{i} {{\n  margin: {}px auto;\n  padding: 8px 1.5rem;\n  font-size: 14px;\n  \
             border: 1px solid #ddd;\n  background: url(img/bg-{i}px.png);\n  width: calc(100% - 32px);\n}}\n",
            i % 64
        ));
        if i % 10 == 0 {
            css.push_str("@media (min-width: 768px) {\n  .card { margin: 24px; }\n}\n");
        }
    }
    css
}

// ============================================================================
// Parsing
// ============================================================================

fn bench_parse(c: &mut Criterion) {
    let css = sample_css(500);
    c.bench_function("parse", |b| {
        b.iter(|| Stylesheet::parse(black_box(&css)));
    });
}

fn bench_parse_serialize(c: &mut Criterion) {
    let css = sample_css(500);
    c.bench_function("parse_serialize", |b| {
        b.iter(|| Stylesheet::parse(black_box(&css)).to_css_string());
    });
}

// ============================================================================
// Rewriting
// ============================================================================

fn bench_rewrite_px(c: &mut Criterion) {
    let css = sample_css(500);
    let rewriter = Rewriter::new(RewriteOptions {
        media_query: true,
        ..Default::default()
    })
    .unwrap();
    c.bench_function("rewrite_px", |b| {
        b.iter(|| rewriter.process(black_box(&css), None));
    });
}

fn bench_rewrite_rem(c: &mut Criterion) {
    let css = sample_css(500);
    let rewriter = Rewriter::new(RewriteOptions::rem()).unwrap();
    c.bench_function("rewrite_rem", |b| {
        b.iter(|| rewriter.process(black_box(&css), None));
    });
}

fn bench_rewrite_already_converted(c: &mut Criterion) {
    let rewriter = Rewriter::new(RewriteOptions::default()).unwrap();
    let css = rewriter.process(&sample_css(500), None);
    c.bench_function("rewrite_already_converted", |b| {
        b.iter(|| rewriter.process(black_box(&css), None));
    });
}

// ============================================================================
// Scale
// ============================================================================

fn bench_compute_scale(c: &mut Criterion) {
    let breakpoints = [480.0, 768.0, 1024.0, 1440.0];
    let layouts = [375.0, 750.0, 1024.0, 1440.0, 1920.0];
    c.bench_function("compute_scale", |b| {
        b.iter(|| {
            (320..2560)
                .step_by(16)
                .map(|w| compute_scale(black_box(w as f64), &breakpoints, &layouts, 1920.0))
                .sum::<f64>()
        });
    });
}

criterion_group!(
    benches,
    // Parsing
    bench_parse,
    bench_parse_serialize,
    // Rewriting
    bench_rewrite_px,
    bench_rewrite_rem,
    bench_rewrite_already_converted,
    // Scale
    bench_compute_scale,
);
criterion_main!(benches);
