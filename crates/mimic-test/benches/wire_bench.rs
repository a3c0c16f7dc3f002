//! Benchmarks for the mimic wire codec

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use mimic_core::{
    EntityId, ParameterDescriptor, ParameterSnapshot, ParameterValue, StateChange, StateHash,
};
use mimic_wire::{Envelope, EnvelopeHeader, HEADER_SIZE};

fn snapshot(count: usize) -> ParameterSnapshot {
    (0..count)
        .map(|i| {
            let value = match i % 4 {
                0 => ParameterValue::Float(i as f32 * 0.5),
                1 => ParameterValue::Int(i as i64),
                2 => ParameterValue::Bool(i % 3 == 0),
                _ => ParameterValue::Trigger(false),
            };
            ParameterDescriptor::new(format!("param_{i}"), value)
        })
        .collect()
}

fn bench_header_parse(c: &mut Criterion) {
    let change = StateChange::new(StateHash::new(7), 0.5);
    let envelope = Envelope::state(EntityId::new(0xDEADBEEF), change);
    let bytes = envelope.serialize().unwrap();
    let header = &bytes[..HEADER_SIZE];

    c.bench_function("header_parse", |b| {
        b.iter(|| EnvelopeHeader::parse(black_box(header)))
    });
}

fn bench_state_roundtrip(c: &mut Criterion) {
    let change = StateChange::new(StateHash::new(-99), 0.25);
    let envelope = Envelope::state(EntityId::new(42), change);

    c.bench_function("state_serialize", |b| {
        b.iter(|| black_box(&envelope).serialize().unwrap())
    });

    let bytes = envelope.serialize().unwrap();
    c.bench_function("state_parse", |b| {
        b.iter(|| Envelope::parse(black_box(&bytes)).unwrap())
    });
}

fn bench_parameter_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("parameter_snapshot");

    for count in [4usize, 16, 40] {
        let envelope = Envelope::parameters(EntityId::new(42), snapshot(count));
        let bytes = envelope.serialize().unwrap();
        group.throughput(Throughput::Bytes(bytes.len() as u64));

        group.bench_function(format!("serialize_{count}"), |b| {
            b.iter(|| black_box(&envelope).serialize().unwrap())
        });
        group.bench_function(format!("parse_{count}"), |b| {
            b.iter(|| Envelope::parse(black_box(&bytes)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_header_parse,
    bench_state_roundtrip,
    bench_parameter_snapshot
);
criterion_main!(benches);
