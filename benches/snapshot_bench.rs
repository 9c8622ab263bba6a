#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use serde::{Deserialize, Serialize};
use snapcode::{
    PersistenceHooks, RecursiveSnapshot, Reflect, SnapshotContext, SnapshotOptions, TypeDef,
    TypeRegistry, Value,
};
use std::hint::black_box;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct Stroke {
    points: Vec<(f32, f32)>,
    width: f32,
}

#[derive(Clone, Debug, Default, Reflect)]
struct Layer {
    name: String,
    opacity: f32,
    strokes: Vec<Stroke>,
}

fn registry() -> TypeRegistry {
    TypeRegistry::builder()
        .register(TypeDef::<Stroke>::value("paint::Stroke"))
        .register(TypeDef::<Layer>::object("paint::Layer"))
        .register_vec::<Stroke>()
        .register_vec::<i64>()
        .build()
        .expect("registry should build")
}

fn generate_layer(strokes: usize) -> Layer {
    Layer {
        name: "ink".into(),
        opacity: 0.8,
        strokes: (0..strokes)
            .map(|i| Stroke {
                points: (0..32).map(|p| (i as f32, p as f32)).collect(),
                width: 2.0,
            })
            .collect(),
    }
}

// --- BENCHMARKS ---

fn bench_capture(c: &mut Criterion) {
    let registry = registry();
    let ctx = SnapshotContext::new(&registry);
    let mut group = c.benchmark_group("Capture");

    for count in [10_usize, 100, 1_000] {
        let numbers: Vec<i64> = (0..count as i64).collect();
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("collection", count), &numbers, |b, numbers| {
            b.iter(|| RecursiveSnapshot::new(&ctx, Value::new(black_box(numbers.clone()))));
        });

        let layer = generate_layer(count);
        group.bench_with_input(BenchmarkId::new("object", count), &layer, |b, layer| {
            b.iter(|| RecursiveSnapshot::new(&ctx, Value::new(black_box(layer.clone()))));
        });
    }
    group.finish();
}

fn bench_restore(c: &mut Criterion) {
    let registry = registry();
    let mut group = c.benchmark_group("Restore");

    for compress in [false, true] {
        let options = SnapshotOptions::default().compression(compress);
        let ctx = SnapshotContext::new(&registry).with_options(options);
        let snapshot = RecursiveSnapshot::new(&ctx, Value::new(generate_layer(500)));
        let json = serde_json::to_string(&snapshot).expect("snapshot should serialize");

        let label = if options.compresses() { "lz4" } else { "plain" };
        group.bench_function(BenchmarkId::new("layer", label), |b| {
            b.iter(|| {
                let mut loaded: RecursiveSnapshot =
                    serde_json::from_str(black_box(&json)).expect("snapshot should deserialize");
                loaded.on_after_load();
                loaded.into_value(&ctx).expect("value should restore")
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_capture, bench_restore);
criterion_main!(benches);
