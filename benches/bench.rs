//! Criterion benchmarks for moodlens.
//!
//! Covers the hot paths of a single analysis call:
//! - Text normalization and tokenization
//! - Rule scoring
//! - Ensemble inference, single and batched
//! - Analytics over a record history

use std::hint::black_box;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use moodlens::analysis::analyzer::{Analyzer, PipelineAnalyzer};
use moodlens::analysis::token_filter::LowercaseFilter;
use moodlens::analysis::tokenizer::WhitespaceTokenizer;
use moodlens::analysis::TextNormalizer;
use moodlens::analytics::{AnalysisRecord, AnalyticsAggregator};
use moodlens::config::EngineConfig;
use moodlens::engine::EmotionEngine;
use moodlens::label::EmotionLabel;
use moodlens::loader::StaticLoader;
use moodlens::ml::{KnnModel, LinearModel, ModelSpec, VocabularyTable};
use moodlens::rules::ContextRuleAdjuster;

const WORDS: [&str; 24] = [
    "happy", "sad", "angry", "worried", "love", "wow", "today", "really", "extremely",
    "tackled", "the", "project", "I'm", "deadline", "grateful", "lonely", "amazing",
    "scared", "furious", "calm", "crushed", "it", "https://example.com", "!!!",
];

/// Generate test texts for benchmarking.
fn generate_texts(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let length = 5 + (i % 30);
            (0..length)
                .map(|j| WORDS[(i * 7 + j * 13) % WORDS.len()])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn engine() -> EmotionEngine {
    let terms = &WORDS[..10];
    let dimension = terms.len();
    let classes = vec![
        EmotionLabel::Joy,
        EmotionLabel::Sadness,
        EmotionLabel::Anger,
        EmotionLabel::Fear,
    ];
    let coef: Vec<Vec<f64>> = (0..classes.len())
        .map(|row| (0..dimension).map(|col| if col % 4 == row { 1.0 } else { -0.2 }).collect())
        .collect();
    let linear = LinearModel::new(classes.clone(), coef.clone(), vec![0.0; classes.len()]);
    let knn = KnnModel::new(3, coef, classes);

    let loader = StaticLoader::new(VocabularyTable::from_terms(terms.iter().copied()))
        .with_model("linear_svc", ModelSpec::LinearSvc(linear.clone()))
        .and_then(|loader| loader.with_model("logistic_regression", ModelSpec::LogisticRegression(linear)))
        .and_then(|loader| loader.with_model("knn", ModelSpec::Knn(knn)))
        .unwrap();
    EmotionEngine::load(EngineConfig::default(), &loader).unwrap()
}

/// Benchmark text normalization and tokenization.
fn bench_text_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("text_analysis");

    let normalizer = TextNormalizer::default();
    let analyzer = PipelineAnalyzer::new(Arc::new(WhitespaceTokenizer::new()))
        .add_filter(Arc::new(LowercaseFilter::new()));
    let texts = generate_texts(1000);

    group.bench_function("normalize_single_text", |b| {
        b.iter(|| black_box(normalizer.normalize(black_box(&texts[0]))))
    });

    group.throughput(Throughput::Elements(100));
    group.bench_function("normalize_and_tokenize_batch", |b| {
        b.iter(|| {
            for text in texts.iter().take(100) {
                let normalized = normalizer.normalize(black_box(text));
                let tokens: Vec<_> = analyzer.analyze(&normalized).unwrap().collect();
                black_box(tokens);
            }
        })
    });

    group.finish();
}

/// Benchmark the keyword rule scorer.
fn bench_rules(c: &mut Criterion) {
    let mut group = c.benchmark_group("rules");

    let normalizer = TextNormalizer::default();
    let adjuster = ContextRuleAdjuster::default();
    let normalized: Vec<_> = generate_texts(100)
        .iter()
        .map(|text| normalizer.normalize(text))
        .collect();

    group.bench_function("score_single_text", |b| {
        b.iter(|| black_box(adjuster.score(black_box(&normalized[0]))))
    });

    group.throughput(Throughput::Elements(normalized.len() as u64));
    group.bench_function("score_batch", |b| {
        b.iter(|| {
            for text in &normalized {
                black_box(adjuster.score(black_box(text)));
            }
        })
    });

    group.finish();
}

/// Benchmark ensemble inference.
fn bench_ensemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("ensemble");

    let engine = engine();
    let texts = generate_texts(500);

    group.bench_function("analyze_ensemble_single", |b| {
        b.iter(|| black_box(engine.analyze_ensemble(black_box(&texts[0]))))
    });

    group.bench_function("analyze_text_single", |b| {
        b.iter(|| black_box(engine.analyze_text(black_box(&texts[1]))))
    });

    group.throughput(Throughput::Elements(texts.len() as u64));
    group.bench_function("analyze_batch_parallel", |b| {
        b.iter(|| black_box(engine.analyze_batch(black_box(&texts))))
    });

    group.bench_function("analyze_batch_sequential", |b| {
        b.iter(|| {
            let results: Vec<_> = texts.iter().map(|text| engine.analyze_text(text)).collect();
            black_box(results)
        })
    });

    group.finish();
}

/// Benchmark analytics over growing histories.
fn bench_analytics(c: &mut Criterion) {
    let mut group = c.benchmark_group("analytics");
    group.sample_size(20);

    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let aggregator = AnalyticsAggregator::default();

    for size in [100usize, 1000, 5000] {
        let records: Vec<_> = (0..size)
            .map(|i| {
                AnalysisRecord::new(
                    start + Duration::minutes(i as i64 * 17),
                    EmotionLabel::ALL[i % EmotionLabel::ALL.len()],
                    (i % 10) as f64 / 10.0,
                )
            })
            .collect();
        let now = start + Duration::minutes(size as i64 * 17);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(format!("summarize_{size}_records"), &records, |b, records| {
            b.iter(|| black_box(aggregator.summarize(black_box(records), now)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_text_analysis,
    bench_rules,
    bench_ensemble,
    bench_analytics
);
criterion_main!(benches);
