//! Benchmarks for the Tagsmith preprocessing and ranking stages.
//!
//! Run with: cargo bench -p tagsmith-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{DynamicImage, Rgba, RgbaImage};
use tagsmith_core::tagging::{filter, ranker, ScoreRanker, TagCatalog};
use tagsmith_core::Preprocessor;

/// Catalog size of the default model.
const CATALOG_SIZE: usize = 9083;

fn synthetic_scores(n: usize) -> Vec<f32> {
    (0..n).map(|i| ((i * 7919) % 10007) as f32 / 10007.0).collect()
}

fn benchmark_preprocess(c: &mut Criterion) {
    let preprocessor = Preprocessor::default();
    let img = DynamicImage::ImageRgba8(RgbaImage::from_fn(1920, 1080, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    }));

    c.bench_function("preprocess_1920x1080", |b| {
        b.iter(|| {
            let _ = preprocessor.process(black_box(&img));
        })
    });
}

fn benchmark_top_k(c: &mut Criterion) {
    let scores = synthetic_scores(CATALOG_SIZE);

    c.bench_function("top_k_250_of_9083", |b| {
        b.iter(|| {
            let _ = ranker::top_k(black_box(&scores), 250);
        })
    });
}

fn benchmark_rank_and_filter(c: &mut Criterion) {
    let scores = synthetic_scores(CATALOG_SIZE);
    let catalog = match TagCatalog::from_names((0..CATALOG_SIZE).map(|i| format!("tag_{i}"))) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Skipping rank benchmark: {e}");
            return;
        }
    };
    let score_ranker = ScoreRanker::new(250);

    c.bench_function("rank_and_filter", |b| {
        b.iter(|| {
            if let Ok(ranked) = score_ranker.rank(black_box(&scores), &catalog) {
                let _ = filter(&ranked, 0.2);
            }
        })
    });
}

criterion_group!(
    benches,
    benchmark_preprocess,
    benchmark_top_k,
    benchmark_rank_and_filter,
);
criterion_main!(benches);
