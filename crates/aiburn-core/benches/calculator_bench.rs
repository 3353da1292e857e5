//! Calculator benchmarks
//!
//! A calculation runs on every slider move, so it should stay well under 1ms
//! even with a few hundred models in the snapshot.

use aiburn_core::calculator::calculate;
use aiburn_core::models::{
    CalculationRequest, Category, ModelPricing, PriceSnapshot, Provider, SnapshotSource,
};
use aiburn_core::pricing::default_snapshot;
use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Snapshot with `count` synthetic models plus GPT-4
fn generate_snapshot(count: usize) -> PriceSnapshot {
    let mut snapshot = default_snapshot();
    snapshot.models.retain(|name, _| name == "GPT-4");
    snapshot.generated_at = Utc::now();
    snapshot.source = SnapshotSource::Remote {
        location: "bench".to_string(),
    };

    for i in 0..count {
        let name = format!("model-{i}");
        snapshot.models.insert(
            name.clone(),
            ModelPricing {
                name,
                provider: Provider::Other("bench".to_string()),
                input_price_per_million: 0.1 + i as f64 * 0.05,
                output_price_per_million: 0.2 + i as f64 * 0.1,
                category: Category::Budget,
            },
        );
    }
    snapshot
}

fn calculate_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("calculate");
    let request = CalculationRequest::quick("GPT-4", 100.0);

    for count in [10, 100, 1000] {
        let snapshot = generate_snapshot(count);
        group.bench_with_input(BenchmarkId::new("models", count), &snapshot, |b, snapshot| {
            b.iter(|| black_box(calculate(snapshot, &request)));
        });
    }

    group.finish();
}

criterion_group!(benches, calculate_benchmark);
criterion_main!(benches);
