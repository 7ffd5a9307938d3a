//! Performance benchmarks for signature parsing, struct resolution and
//! dependency closure.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use qidl::{Method, ModelClosure, RawClass, RawModel, Signature, SignatureRegistry};
use qidl_resolver::{ConstructorCandidate, FieldCandidate, MethodCandidate, StructCandidates, StructResolver};
use std::hint::black_box;

/// Benchmark parsing and serialization of signatures of growing nesting
fn signature_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("signature");

    let inputs = [
        ("scalar", "i".to_string()),
        ("meta_object", "({I(Isss[(ss)]s)}{I(Is)}s)".to_string()),
        (
            "named_struct",
            "(ds[(ii)<ns::Cell,row,col>]{so<ns::Robot>})<ns::Map,scale,name,cells,robots>".to_string(),
        ),
        ("deep_lists", format!("{}i{}", "[".repeat(64), "]".repeat(64))),
    ];

    for (name, text) in &inputs {
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("parse", name), text, |b, text| {
            b.iter(|| Signature::parse(black_box(text)))
        });

        let Ok(parsed) = Signature::parse(text) else {
            continue;
        };
        group.bench_with_input(BenchmarkId::new("serialize", name), &parsed, |b, sig| {
            b.iter(|| black_box(sig).to_string())
        });
    }

    group.finish();
}

/// Benchmark struct resolution with growing field counts
fn struct_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("struct_resolver");
    let scalars = ["i", "d", "s", "L", "b", "f", "c", "w"];

    for fields in [4usize, 16, 64] {
        let mut candidates = StructCandidates::new("bench::Wide", "");
        let mut constructor = Vec::new();
        for i in 0..fields {
            // Distinct signatures keep constructor matching enabled.
            let Ok(atom) = Signature::parse(scalars[i % scalars.len()]) else {
                continue;
            };
            let sig = wrap_lists(atom, i / scalars.len());
            if i % 2 == 0 {
                candidates = candidates.with_field(FieldCandidate::new(format!("f{i}"), sig, ""));
            } else {
                candidates = candidates
                    .with_method(MethodCandidate::new(format!("getF{i}"), vec![], sig.clone(), ""));
                constructor.push(sig);
            }
        }
        candidates = candidates.with_constructor(ConstructorCandidate::new(constructor));

        group.bench_with_input(BenchmarkId::from_parameter(fields), &candidates, |b, cands| {
            b.iter(|| {
                let mut registry = SignatureRegistry::new();
                StructResolver::new(&mut registry).resolve(black_box(cands))
            })
        });
    }

    group.finish();
}

fn wrap_lists(mut sig: Signature, depth: usize) -> Signature {
    for _ in 0..depth {
        sig = Signature::list(sig);
    }
    sig
}

/// Benchmark closure over a chain of classes
fn closure_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("closure");

    for size in [10usize, 100, 1000] {
        let mut model = RawModel::new();
        for i in 0..size {
            let ret = Signature::object(format!("bench::C{}", (i + 1) % size));
            let class = RawClass::new(format!("bench::C{i}"), "")
                .with_method(Method::new("next", vec![], ret, ""));
            let _ = model.insert_class(class);
        }

        group.bench_with_input(BenchmarkId::from_parameter(size), &model, |b, model| {
            b.iter(|| model.closure(black_box(["bench::C0"])))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    signature_benchmarks,
    struct_benchmarks,
    closure_benchmarks
);

criterion_main!(benches);
