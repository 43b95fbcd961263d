use std::hint::black_box;

use commodity_risk::quant::portfolio::linspace;
use commodity_risk::CorrelatedReturnSimulator;
use commodity_risk::PortfolioOptimizer;
use commodity_risk::RiskEstimator;
use commodity_risk::SimulationConfig;
use criterion::criterion_group;
use criterion::criterion_main;
use criterion::BenchmarkId;
use criterion::Criterion;

fn three_assets() -> (Vec<f64>, Vec<Vec<f64>>) {
  let mu = vec![0.08, 0.1, 0.12];
  let cov = vec![
    vec![0.04, 0.01, 0.0],
    vec![0.01, 0.09, 0.02],
    vec![0.0, 0.02, 0.16],
  ];
  (mu, cov)
}

fn bench_simulation(c: &mut Criterion) {
  let mut group = c.benchmark_group("CorrelatedReturnSimulator");

  for &paths in &[1_000usize, 10_000, 100_000] {
    let config = SimulationConfig::new(
      vec![500_000.0, 500_000.0],
      vec![0.2, 0.15],
      vec![vec![1.0, 0.8], vec![0.8, 1.0]],
      paths,
    )
    .with_seed(42);
    let sim = CorrelatedReturnSimulator::new(config).unwrap();

    group.bench_with_input(BenchmarkId::new("simulate", paths), &paths, |b, _| {
      b.iter(|| black_box(sim.simulate()))
    });
  }

  group.finish();
}

fn bench_risk(c: &mut Criterion) {
  let config = SimulationConfig::new(
    vec![500_000.0, 500_000.0],
    vec![0.2, 0.15],
    vec![vec![1.0, 0.8], vec![0.8, 1.0]],
    100_000,
  )
  .with_seed(7);
  let samples = CorrelatedReturnSimulator::new(config).unwrap().simulate();
  let estimator = RiskEstimator::new(0.95).unwrap();

  c.bench_function("RiskEstimator/report_100k", |b| {
    b.iter(|| black_box(estimator.report_with_tail(&samples, 0.975).unwrap()))
  });
}

fn bench_optimizer(c: &mut Criterion) {
  let (mu, cov) = three_assets();
  let optimizer = PortfolioOptimizer::default();
  let mut group = c.benchmark_group("PortfolioOptimizer");

  group.bench_function("max_sharpe", |b| {
    b.iter(|| black_box(optimizer.optimize(&mu, &cov).unwrap()))
  });

  let targets = linspace(0.08, 0.12, 32);
  group.bench_function("frontier_lazy_32", |b| {
    b.iter(|| black_box(optimizer.frontier(&mu, &cov, targets.iter().copied()).count()))
  });
  group.bench_function("frontier_par_32", |b| {
    b.iter(|| black_box(optimizer.frontier_par(&mu, &cov, &targets)))
  });

  group.finish();
}

criterion_group!(benches, bench_simulation, bench_risk, bench_optimizer);
criterion_main!(benches);
