//! Benchmarks for cradle core operations.
//!
//! Run with: cargo bench
//!
//! Results include 95% confidence intervals via Criterion.

use cradle::core::classifier::{classify, classify_map};
use cradle::core::recipe::parse_recipe;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_yaml_ng::{Mapping, Value};

const RECIPE: &str = r#"
name: bench-service
lifecycle:
  init: install.sh
  preStart: [mkdir -p /var/run/app, chown app /var/run/app]
  start: [./bin/app --config /etc/app.yaml, tail -f /var/log/app.log]
  stop: !script |
    stop_app(grace: 30)
    wait_for_port_closed(8080)
  monitors:
    http: curl -sf localhost:8080/health
    jmx: [jmx-probe.sh, --port, "9999"]
custom_commands:
  backup: backup.sh
  db:
    migrate: migrate.sh
    seed: [seed.sh, --fixtures]
templates:
  small:
    image_id: ubuntu-22.04
    machine_memory_mb: 1600
    remote_directory: /opt/app
    local_directory: upload
"#;

/// Mapping `depth` levels deep with `width` keys per level.
fn nested(depth: usize, width: usize) -> Value {
    let mut mapping = Mapping::new();
    for i in 0..width {
        let value = if depth == 0 {
            Value::Sequence(vec![
                Value::String(format!("cmd-{i}-a")),
                Value::String(format!("cmd-{i}-b")),
            ])
        } else {
            nested(depth - 1, width)
        };
        mapping.insert(Value::String(format!("event-{i}")), value);
    }
    Value::Mapping(mapping)
}

fn bench_classify_nested(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify_nested");
    for depth in [1, 3, 5] {
        let raw = nested(depth, 4);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &raw, |b, raw| {
            b.iter(|| {
                let entry = classify(black_box(raw), "root").unwrap();
                black_box(entry);
            });
        });
    }
    group.finish();
}

fn bench_classify_sequence(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify_sequence");
    for len in [8, 64, 512] {
        let raw = Value::Sequence(
            (0..len)
                .map(|i| Value::String(format!("step {i}")))
                .collect(),
        );
        group.bench_with_input(BenchmarkId::from_parameter(len), &raw, |b, raw| {
            b.iter(|| black_box(classify(black_box(raw), "start").unwrap()));
        });
    }
    group.finish();
}

fn bench_recipe_parse(c: &mut Criterion) {
    let lifecycle: Value = serde_yaml_ng::from_str::<Value>(RECIPE).unwrap()["lifecycle"].clone();

    c.bench_function("classify_lifecycle_section", |b| {
        b.iter(|| black_box(classify_map(black_box(&lifecycle), "lifecycle").unwrap()));
    });

    c.bench_function("parse_recipe", |b| {
        b.iter(|| {
            let recipe = parse_recipe(black_box(RECIPE)).unwrap();
            black_box(recipe);
        });
    });
}

criterion_group!(
    benches,
    bench_classify_nested,
    bench_classify_sequence,
    bench_recipe_parse
);
criterion_main!(benches);
