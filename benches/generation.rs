//! Translation and sampling benchmarks.
//!
//! Run with:
//! ```bash
//! cargo bench --bench generation
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use symrex::types::Encoding;
use symrex::{RexEngine, RexOptions};

const PATTERNS: &[(&str, &str)] = &[
    ("phone", r"^\d{3}-\d{3}-\d{4}$"),
    ("email", r"^[\w.+-]+@[a-z\d-]+(\.[a-z\d-]+)*\.[a-z]+$"),
    ("unanchored", r"ab+c"),
    ("classes", r"^[\p{L}--[a-z]]{2,5}\s[[:punct:]]$"),
];

// ============================================================================
// Translation
// ============================================================================

fn bench_create_automaton(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_automaton");

    for encoding in [Encoding::Ascii, Encoding::Utf16] {
        for &(name, pattern) in PATTERNS {
            group.bench_with_input(BenchmarkId::new(encoding.to_string(), name), &pattern, |b, &pattern| {
                b.iter(|| {
                    // Fresh engine, so that the solver caches start cold
                    let engine = RexEngine::new(RexOptions::default().with_encoding(encoding).with_seed(0));
                    engine.create_automaton(pattern).map(|a| a.num_states())
                });
            });
        }
    }

    group.finish();
}

// ============================================================================
// Sampling
// ============================================================================

fn bench_generate_many(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_many");

    for count in [10usize, 100, 1000] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut engine = RexEngine::new(RexOptions::default().with_seed(1));
            let automaton = engine
                .create_automaton(r"^[\w.+-]+@[a-z\d-]+\.[a-z]{2,4}$")
                .unwrap();
            b.iter(|| engine.generate_many(&automaton, count));
        });
    }

    group.finish();
}

fn bench_intersection(c: &mut Criterion) {
    c.bench_function("intersection", |b| {
        b.iter(|| {
            let engine = RexEngine::new(RexOptions::default().with_seed(2));
            engine
                .create_automaton_from_patterns(&[r"^\w{4,12}$", r"\d", r"[A-Z]", r"^[^_]*$"])
                .map(|a| a.num_moves())
        });
    });
}

criterion_group!(benches, bench_create_automaton, bench_generate_many, bench_intersection);

criterion_main!(benches);
