//! Benchmarks for the DP kernel cores: one `criterion_group` per concern,
//! `criterion_main!` at the bottom.

use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use tsc_data::{DataPoint, TimeSeries};
use tsc_kernels::{DtwKernel, EdrKernel, ErpKernel, Window};
use tsc_traits::DistanceKernel;

fn series(n: usize, phase: f64) -> Arc<TimeSeries> {
    let mut ts = TimeSeries::new();
    for i in 0..n {
        let x = i as f64;
        let y = (x * 0.1 + phase).sin();
        ts.push(DataPoint::new(x, y));
    }
    Arc::new(ts)
}

fn dtw_unconstrained(c: &mut Criterion) {
    let a = series(200, 0.0);
    let b = series(200, 0.3);
    let kernel = DtwKernel::new(false);
    c.bench_function("dtw_unconstrained_200", |bencher| {
        bencher.iter(|| kernel.distance(&a, &b).unwrap());
    });
}

fn dtw_sakoe_chiba(c: &mut Criterion) {
    let a = series(200, 0.0);
    let b = series(200, 0.3);
    let kernel = DtwKernel::windowed(Window::SakoeChiba { r: 0.1, w: 0 }, false).unwrap();
    c.bench_function("dtw_sakoe_chiba_200_r0.1", |bencher| {
        bencher.iter(|| kernel.distance(&a, &b).unwrap());
    });
}

fn edr_unconstrained(c: &mut Criterion) {
    let a = series(200, 0.0);
    let b = series(200, 0.3);
    let kernel = EdrKernel::new(0.1, false).unwrap();
    c.bench_function("edr_unconstrained_200", |bencher| {
        bencher.iter(|| kernel.distance(&a, &b).unwrap());
    });
}

fn erp_unconstrained(c: &mut Criterion) {
    let a = series(200, 0.0);
    let b = series(200, 0.3);
    let kernel = ErpKernel::new(0.0, false).unwrap();
    c.bench_function("erp_unconstrained_200", |bencher| {
        bencher.iter(|| kernel.distance(&a, &b).unwrap());
    });
}

criterion_group!(
    benches,
    dtw_unconstrained,
    dtw_sakoe_chiba,
    edr_unconstrained,
    erp_unconstrained
);
criterion_main!(benches);
