//! Benchmarks for formatting and query evaluation
//!
//! Run with: cargo bench

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use ppm_dashboard::backend::{timestamp_value, CollectionQuery, Direction, Document, Filter};
use ppm_dashboard::format::{format_large_number, time_ago};

fn create_test_docs(count: usize) -> Vec<Document> {
    let now = Utc.with_ymd_and_hms(2025, 1, 15, 8, 0, 0).unwrap();
    let statuses = ["In Progress", "Planning", "Completed", "Cancelled"];
    (0..count)
        .map(|i| {
            Document::new(format!("doc-{}", i))
                .field("status", statuses[i % statuses.len()])
                .field("date", timestamp_value(now - Duration::minutes(i as i64 * 37)))
        })
        .collect()
}

fn bench_formatters(c: &mut Criterion) {
    let mut group = c.benchmark_group("format");
    let now = Utc.with_ymd_and_hms(2025, 1, 15, 8, 0, 0).unwrap();

    group.bench_function("time_ago", |b| {
        let dates: Vec<_> = [0, 5, 90, 60 * 30, 60 * 24 * 400]
            .iter()
            .map(|m| Some(now - Duration::minutes(*m)))
            .collect();
        b.iter(|| {
            for date in &dates {
                black_box(time_ago(black_box(*date), now));
            }
        })
    });

    group.bench_function("format_large_number", |b| {
        let values = [0.0, 999.0, 12_500.0, 183_800_000.0, 7.2e12];
        b.iter(|| {
            for value in values {
                black_box(format_large_number(black_box(value), 1, "Rp"));
            }
        })
    });

    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");

    for size in [100, 1000, 10000] {
        let docs = create_test_docs(size);
        group.throughput(Throughput::Elements(size as u64));

        let not_in = CollectionQuery::new("projectsPPM")
            .filter(Filter::not_in("status", ["Completed", "Cancelled"]));
        group.bench_function(format!("not_in_{}", size), |b| {
            b.iter(|| not_in.apply(black_box(&docs)))
        });

        let recent = CollectionQuery::new("activityLogEntries")
            .order_by("date", Direction::Desc)
            .limit(6);
        group.bench_function(format!("order_limit_{}", size), |b| {
            b.iter(|| recent.apply(black_box(&docs)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_formatters, bench_query);
criterion_main!(benches);
