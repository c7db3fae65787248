//! Benchmarks for name matching.
//!
//! Run with: cargo bench
//!
//! This benchmark suite measures:
//! - Query throughput for each rule class
//! - Scalability with different rule set sizes
//! - Rule compilation time

use blockname::BlockRules;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// Generate a rule file with the given number of suffix rules.
///
/// One in fifty suffix rules is replaced by a prefix, substring or glob rule.
fn generate_rules(count: usize) -> String {
    let mut text = String::new();
    for i in 0..count {
        match i % 50 {
            0 => text.push_str(&format!("prefix{}.*\n", i)),
            1 => text.push_str(&format!("*substr{}*\n", i)),
            2 => text.push_str(&format!("glob{}-??.example.net\n", i)),
            _ => text.push_str(&format!("domain{}.example.com\n", i)),
        }
    }
    text
}

/// Generate test queries - mix of hits and misses.
fn generate_queries(count: usize, hit_ratio: f64) -> Vec<String> {
    let mut queries = Vec::with_capacity(count);
    let hits = (count as f64 * hit_ratio) as usize;

    // Queries that will hit
    for i in 0..hits {
        if i % 2 == 0 {
            queries.push(format!("domain{}.example.com", 3 + i % 40));
        } else {
            queries.push(format!("cdn.domain{}.example.com", 3 + i % 40));
        }
    }

    // Queries that will miss
    for i in hits..count {
        queries.push(format!("unknown{}.nonexistent.org", i));
    }

    queries
}

/// Benchmark mixed query throughput.
fn bench_match_mixed(c: &mut Criterion) {
    let rules = BlockRules::from_reader(generate_rules(10_000).as_bytes()).unwrap();
    let queries = generate_queries(1000, 0.8);

    let mut group = c.benchmark_group("match_mixed");
    group.throughput(Throughput::Elements(queries.len() as u64));

    group.bench_function("mixed_queries", |b| {
        b.iter(|| {
            for query in &queries {
                black_box(rules.match_name(query));
            }
        })
    });

    group.finish();
}

/// Benchmark each rule class in isolation.
fn bench_match_by_class(c: &mut Criterion) {
    let rules = BlockRules::from_reader(generate_rules(10_000).as_bytes()).unwrap();

    let mut group = c.benchmark_group("match_by_class");

    group.bench_function("suffix_hit", |b| {
        b.iter(|| black_box(rules.match_name("a.b.domain503.example.com")))
    });
    group.bench_function("prefix_hit", |b| {
        b.iter(|| black_box(rules.match_name("prefix500.example.org")))
    });
    group.bench_function("substring_hit", |b| {
        b.iter(|| black_box(rules.match_name("xsubstr501x.example.org")))
    });
    group.bench_function("pattern_hit", |b| {
        b.iter(|| black_box(rules.match_name("glob502-ab.example.net")))
    });
    group.bench_function("miss", |b| {
        b.iter(|| black_box(rules.match_name("nothing.to.see.here")))
    });

    group.finish();
}

/// Benchmark scalability with different rule set sizes.
fn bench_scalability(c: &mut Criterion) {
    let mut group = c.benchmark_group("scalability");

    for size in [100, 1_000, 10_000, 50_000].iter() {
        let rules = BlockRules::from_reader(generate_rules(*size).as_bytes()).unwrap();

        group.throughput(Throughput::Elements(100));
        group.bench_with_input(BenchmarkId::new("rules", size), size, |b, _| {
            let queries: Vec<_> = (0..100)
                .map(|i| format!("www.domain{}.example.com", i % size))
                .collect();
            b.iter(|| {
                for query in &queries {
                    black_box(rules.match_name(query));
                }
            })
        });
    }

    group.finish();
}

/// Benchmark rule compilation.
fn bench_compile(c: &mut Criterion) {
    let text = generate_rules(10_000);

    c.bench_function("compile_10k", |b| {
        b.iter(|| black_box(BlockRules::from_reader(text.as_bytes()).unwrap()))
    });
}

criterion_group!(
    benches,
    bench_match_mixed,
    bench_match_by_class,
    bench_scalability,
    bench_compile
);
criterion_main!(benches);
