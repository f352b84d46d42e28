//! Benchmarks for partition scoring and resolution.
//!
//! CEAF-e dominates on large documents because of the cubic assignment step;
//! the `ceaf_e` group isolates it.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use stroll::eval::{ceaf_e_score, score_partitions};
use stroll::{resolve, Document, HeadMatchScorer, Mention, MentionId, Partition};

/// `n` mentions in clusters of `size`, and the same mentions shifted by one
/// so every cluster is split.
fn partitions(n: u32, size: u32) -> (Partition<u32>, Partition<u32>) {
    let chunk = |offset: u32| -> Vec<Vec<u32>> {
        let ids: Vec<u32> = (0..n).map(|i| (i + offset) % n).collect();
        ids.chunks(size as usize).map(<[u32]>::to_vec).collect()
    };
    (
        Partition::new(chunk(0)).unwrap_or_default(),
        Partition::new(chunk(1)).unwrap_or_default(),
    )
}

fn document(n: usize) -> Document {
    let heads = ["Anna", "Bram", "zij", "hij", "stad", "Anna", "bedrijf"];
    let mut doc = Document::new("bench", 0);
    for i in 0..n {
        doc.push_mention(Mention::new(MentionId::new(0, i / 3, i % 3), heads[i % heads.len()]));
    }
    doc
}

fn bench_score_partitions(c: &mut Criterion) {
    let mut group = c.benchmark_group("score_partitions");
    for &n in &[50u32, 200, 800] {
        let (gold, system) = partitions(n, 4);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| score_partitions(black_box(&gold), black_box(&system)))
        });
    }
    group.finish();
}

fn bench_ceaf_e(c: &mut Criterion) {
    let mut group = c.benchmark_group("ceaf_e");
    group.sample_size(20);
    for &n in &[100u32, 400] {
        let (gold, system) = partitions(n, 2);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| ceaf_e_score(black_box(&gold), black_box(&system)))
        });
    }
    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    let scorer = HeadMatchScorer::default();
    for &n in &[100usize, 1000] {
        let doc = document(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &doc, |b, doc| {
            b.iter(|| resolve(black_box(doc), 20, &scorer))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_score_partitions, bench_ceaf_e, bench_resolve);
criterion_main!(benches);
