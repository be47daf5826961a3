//! Benchmarks for the analysis pipeline.
//!
//! Measures tokenization alone, a full uncached analysis, and a cache hit,
//! over sources of increasing size.

use algoscope::{extract, infer, tokenize, Analyzer, Language};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

/// A Python module with `functions` copies of a nested-loop function, a
/// memoized recursion and a binary search.
fn python_source(functions: usize) -> String {
    let mut source = String::new();
    for i in 0..functions {
        source.push_str(&format!(
            r#"
def pairs_{i}(a, b):
    count = 0
    for x in a:
        for y in b:
            if x == y:
                count += 1
    return count

def ways_{i}(n, memo={{}}):
    if n in memo:
        return memo[n]
    if n < 2:
        return 1
    memo[n] = ways_{i}(n - 1, memo) + ways_{i}(n - 2, memo)
    return memo[n]

def search_{i}(a, t):
    lo, hi = 0, len(a) - 1
    while lo <= hi:
        mid = (lo + hi) // 2
        if a[mid] == t:
            return mid
        elif a[mid] < t:
            lo = mid + 1
        else:
            hi = mid - 1
    return -1
"#
        ));
    }
    source
}

fn bench_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");
    for functions in [1, 10, 100] {
        let source = python_source(functions);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(functions), &source, |b, s| {
            b.iter(|| tokenize(black_box(s), Language::Python))
        });
    }
    group.finish();
}

fn bench_extract_and_infer(c: &mut Criterion) {
    let source = python_source(10);
    let tokens = tokenize(&source, Language::Python).unwrap();
    c.bench_function("extract_and_infer", |b| {
        b.iter(|| infer(&extract(black_box(&tokens))))
    });
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");
    for functions in [1, 10, 100] {
        let source = python_source(functions);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::new("uncached", functions), &source, |b, s| {
            b.iter(|| Analyzer::default().analyze(black_box(s), Language::Python))
        });

        let warm = Analyzer::default();
        let _ = warm.analyze(&source, Language::Python);
        group.bench_with_input(BenchmarkId::new("cached", functions), &source, |b, s| {
            b.iter(|| warm.analyze(black_box(s), Language::Python))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_tokenize, bench_extract_and_infer, bench_analyze);
criterion_main!(benches);
