//! Criterion benchmark: pipeline throughput.
//!
//! Measures a single `run_tick` for each scenario, a full `FixedUpdate`
//! pass through the plugin, and exporting a full session window.
//!
//! Run with: cargo bench -p junction_sim --bench pipeline_bench --features bench

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use junction_sim::config::{ClassifierModel, PipelineConfig};
use junction_sim::session::ExportFormat;
use junction_sim::signal::{allocate, SignalPlan};
use junction_sim::stream::Scenario;
use junction_sim::test_harness::TestJunction;
use junction_sim::Pipeline;

fn bench_run_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_tick");
    for scenario in Scenario::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(scenario), &scenario, |b, &s| {
            let mut pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
            b.iter(|| black_box(pipeline.run_tick(s).ok()));
        });
    }
    group.bench_function("ensemble", |b| {
        let config = PipelineConfig {
            classifier_model: ClassifierModel::Ensemble,
            ..Default::default()
        };
        let mut pipeline = Pipeline::new(config).unwrap();
        b.iter(|| black_box(pipeline.run_tick(Scenario::IncidentEastbound).ok()));
    });
    group.finish();
}

fn bench_allocate(c: &mut Criterion) {
    let params = PipelineConfig::default().signal;
    c.bench_function("allocate_rate_limited", |b| {
        let mut prior: Option<SignalPlan> = None;
        let mut ns = 0.0_f32;
        b.iter(|| {
            ns = (ns + 7.0) % 120.0;
            let plan = allocate(black_box(ns), black_box(40.0), prior.as_ref(), &params).unwrap();
            prior = Some(plan);
        });
    });
}

fn bench_fixed_update(c: &mut Criterion) {
    c.bench_function("fixed_update_tick", |b| {
        let mut junction = TestJunction::new();
        b.iter(|| junction.tick(1));
    });
}

fn bench_export(c: &mut Criterion) {
    let mut pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
    for _ in 0..pipeline.config().window_capacity {
        let _ = pipeline.run_tick(Scenario::MorningPeak);
    }
    let mut group = c.benchmark_group("export_full_window");
    for format in [ExportFormat::Csv, ExportFormat::Json] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format.extension()),
            &format,
            |b, &f| b.iter(|| black_box(pipeline.get_window_export(f))),
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_run_tick,
    bench_allocate,
    bench_fixed_update,
    bench_export
);
criterion_main!(benches);
