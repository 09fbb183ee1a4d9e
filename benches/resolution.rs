//! Dispatch resolution benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use protean::prelude::*;

fn benchmark_exact_dispatch(c: &mut Criterion) {
    let registry = bootstrap().unwrap();
    let mut group = c.benchmark_group("exact");

    group.bench_function("equal_i64", |b| {
        b.iter(|| {
            let out = registry
                .call("equal", &[Value::I64(1), Value::I64(2)])
                .unwrap();
            black_box(out)
        });
    });

    group.bench_function("fold_vec_seq", |b| {
        let xs = vec_seq::of_i64(&[1, 2, 3, 4, 5, 6, 7, 8]);
        let add = Value::fn2("add", |_, acc, x| {
            Ok(Value::I64(acc.as_i64().unwrap_or(0) + x.as_i64().unwrap_or(0)))
        });
        b.iter(|| {
            let out = registry
                .call("fold", &[xs.clone(), Value::I64(0), add.clone()])
                .unwrap();
            black_box(out)
        });
    });
    group.finish();
}

fn benchmark_derived_dispatch(c: &mut Criterion) {
    let registry = bootstrap().unwrap();
    let mut group = c.benchmark_group("derived");

    group.bench_function("length_vec_seq", |b| {
        let xs = vec_seq::of_i64(&[1, 2, 3, 4, 5, 6, 7, 8]);
        b.iter(|| {
            let out = registry.call("length", &[xs.clone()]).unwrap();
            black_box(out)
        });
    });

    group.bench_function("sort_vec_seq", |b| {
        let xs = vec_seq::of_i64(&[5, 3, 8, 1, 9, 2, 7, 4]);
        b.iter(|| {
            let out = registry.call("sort", &[xs.clone()]).unwrap();
            black_box(out)
        });
    });
    group.finish();
}

fn benchmark_cross_type_dispatch(c: &mut Criterion) {
    let registry = bootstrap().unwrap();
    let mut group = c.benchmark_group("cross_type");

    group.bench_function("plus_i32_i64", |b| {
        b.iter(|| {
            let out = registry
                .call("plus", &[Value::I32(2), Value::I64(40)])
                .unwrap();
            black_box(out)
        });
    });

    group.bench_function("equal_mixed_constants", |b| {
        b.iter(|| {
            let out = registry
                .call(
                    "equal",
                    &[integral::int_const(5), integral::long_const(5)],
                )
                .unwrap();
            black_box(out)
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_exact_dispatch,
    benchmark_derived_dispatch,
    benchmark_cross_type_dispatch
);
criterion_main!(benches);
