//! Criterion benchmarks for performance-critical paths.
//!
//! Covers query tokenizing, relevance ranking and the collection engine
//! scan that ranking sits on top of.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use serde_json::json;

use cms_search::config::SearchConfig;
use cms_search::core::ModelDescriptor;
use cms_search::models::{MemoryModel, SearchableModel};
use cms_search::search::ranking::{DefaultScorer, rank_records, score};
use cms_search::search::tokenizer::{split_words, tokenize};
use cms_search::search::SearchContext;

const WORDS: &[&str] = &[
    "garden", "tomato", "running", "quickly", "the", "harvest", "season", "and", "compost",
    "watering", "sunlight", "greenhouse", "seeds", "of", "planting",
];

fn sentence(len: usize, offset: usize) -> String {
    (0..len)
        .map(|i| WORDS[(i + offset) % WORDS.len()])
        .collect::<Vec<_>>()
        .join(" ")
}

fn model(size: usize) -> MemoryModel {
    MemoryModel::from_rows(
        ModelDescriptor::new("Article", "articles").searchable(["title", "excerpt", "body"]),
        (0..size).map(|i| {
            json!({
                "id": i,
                "title": sentence(4, i),
                "excerpt": sentence(12, i * 3),
                "body": sentence(120, i * 7),
            })
        }),
    )
}

// =============================================================================
// Tokenizer Benchmarks
// =============================================================================

fn tokenizer_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");

    for size in [5, 50, 500].iter() {
        let input = sentence(*size, 0);
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::new("stemmed", size), &input, |b, input| {
            b.iter(|| tokenize(black_box(input)))
        });
        group.bench_with_input(BenchmarkId::new("simple", size), &input, |b, input| {
            b.iter(|| split_words(black_box(input)))
        });
    }

    group.finish();
}

// =============================================================================
// Ranking Benchmarks
// =============================================================================

fn ranking_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("ranking");

    let single = model(1).all_records(None).unwrap_or_default();
    if let Some(record) = single.first() {
        let terms = split_words("garden tomato harvest");
        group.bench_function("score_single_record", |b| {
            b.iter(|| score(black_box(record), black_box(&terms)))
        });
    }

    for size in [100, 1000].iter() {
        let records = model(*size).all_records(None).unwrap_or_default();
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("rank_records", size), &records, |b, records| {
            b.iter(|| rank_records(black_box(records.clone()), "garden tomato", &DefaultScorer))
        });
    }

    group.finish();
}

// =============================================================================
// Collection Engine Benchmarks
// =============================================================================

fn collection_search_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("collection_search");
    let ctx = SearchContext::new(SearchConfig {
        driver: "collection".into(),
        ..SearchConfig::default()
    });

    for size in [100, 1000].iter() {
        let model = model(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("get_ranked", size), &model, |b, model| {
            b.iter(|| {
                ctx.search(model, black_box("greenhouse"))
                    .and_then(|search| search.get_ranked(None))
                    .map(|records| records.len())
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    tokenizer_benchmarks,
    ranking_benchmarks,
    collection_search_benchmarks
);
criterion_main!(benches);
