//! # Efficient Frontier
//!
//! $$
//! \sigma^\*(m) = \min_{\mathbf{w}} \sqrt{\mathbf{w}^\top\Sigma\mathbf{w}}
//! \quad\text{s.t.}\quad \mathbf{w}^\top\mu = m,\ \textstyle\sum_i w_i = 1,\ l \le \mathbf{w} \le u
//! $$
//!
//! Each target return is solved independently. A failed target is reported
//! on its own and never discards its neighbours.

use rayon::prelude::*;
use tracing::warn;

use super::engine::OptimizerConfig;
use super::optimizers::minimize_variance_at;
use super::types::EfficientFrontier;
use super::types::FrontierPoint;
use crate::error::Result;

/// `n` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
  match n {
    0 => Vec::new(),
    1 => vec![start],
    _ => {
      let step = (end - start) / (n - 1) as f64;
      (0..n).map(|i| start + step * i as f64).collect()
    }
  }
}

fn solve_point(
  mu: &[f64],
  cov: &[Vec<f64>],
  target: f64,
  config: &OptimizerConfig,
) -> Result<FrontierPoint> {
  minimize_variance_at(mu, cov, target, config).map_err(|err| {
    warn!(target_return = target, error = %err, "skipping frontier point");
    err.at_target(target)
  })
}

/// Lazy frontier sweep over a sequence of target returns.
pub struct FrontierSweep<'a, I> {
  mu: &'a [f64],
  cov: &'a [Vec<f64>],
  config: &'a OptimizerConfig,
  targets: I,
}

impl<'a, I> FrontierSweep<'a, I>
where
  I: Iterator<Item = f64>,
{
  pub(crate) fn new(
    mu: &'a [f64],
    cov: &'a [Vec<f64>],
    config: &'a OptimizerConfig,
    targets: I,
  ) -> Self {
    Self {
      mu,
      cov,
      config,
      targets,
    }
  }

  /// Drop failed targets and keep only solved points.
  pub fn solved(self) -> impl Iterator<Item = FrontierPoint> + 'a
  where
    I: 'a,
  {
    self.filter_map(Result::ok)
  }
}

impl<I> Iterator for FrontierSweep<'_, I>
where
  I: Iterator<Item = f64>,
{
  type Item = Result<FrontierPoint>;

  fn next(&mut self) -> Option<Self::Item> {
    let target = self.targets.next()?;
    Some(solve_point(self.mu, self.cov, target, self.config))
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    self.targets.size_hint()
  }
}

/// Solve every target on the rayon pool and assemble the frontier sorted by
/// target return.
pub fn sweep_par(
  mu: &[f64],
  cov: &[Vec<f64>],
  targets: &[f64],
  config: &OptimizerConfig,
) -> EfficientFrontier {
  let outcomes: Vec<Result<FrontierPoint>> = targets
    .par_iter()
    .map(|&target| solve_point(mu, cov, target, config))
    .collect();

  let mut frontier = EfficientFrontier::default();
  for outcome in outcomes {
    match outcome {
      Ok(point) => frontier.points.push(point),
      Err(err) => frontier.failures.push(err),
    }
  }
  frontier
    .points
    .sort_by(|a, b| a.target_return.total_cmp(&b.target_return));
  frontier
}

#[cfg(test)]
mod tests {
  use tracing_test::traced_test;

  use super::*;
  use crate::error::RiskError;
  use crate::quant::portfolio::data::portfolio_variance;
  use crate::quant::portfolio::engine::PortfolioOptimizer;

  fn three_assets() -> (Vec<f64>, Vec<Vec<f64>>) {
    let mu = vec![0.08, 0.1, 0.12];
    let cov = vec![
      vec![0.04, 0.01, 0.0],
      vec![0.01, 0.09, 0.02],
      vec![0.0, 0.02, 0.16],
    ];
    (mu, cov)
  }

  #[test]
  fn linspace_includes_both_ends() {
    let grid = linspace(0.0, 0.3, 4);
    assert_eq!(grid.len(), 4);
    assert_eq!(grid[0], 0.0);
    assert!((grid[3] - 0.3).abs() < 1e-15);
    assert!(linspace(1.0, 2.0, 0).is_empty());
    assert_eq!(linspace(1.0, 2.0, 1), vec![1.0]);
  }

  #[test]
  fn volatility_rises_along_upper_frontier() {
    let (mu, cov) = three_assets();
    let optimizer = PortfolioOptimizer::default();

    // The global minimum-variance portfolio earns about 0.0901.
    let points: Vec<FrontierPoint> = optimizer
      .frontier(&mu, &cov, linspace(0.095, 0.12, 6))
      .solved()
      .collect();

    assert_eq!(points.len(), 6);
    for pair in points.windows(2) {
      assert!(pair[1].volatility >= pair[0].volatility - 1e-9);
    }
    for point in &points {
      let var = portfolio_variance(&point.weights, &cov);
      assert!((var.sqrt() - point.volatility).abs() < 1e-12);
    }
  }

  #[test]
  #[traced_test]
  fn unreachable_targets_are_skipped_and_logged() {
    let (mu, cov) = three_assets();
    let optimizer = PortfolioOptimizer::default();
    let results: Vec<Result<FrontierPoint>> =
      optimizer.frontier(&mu, &cov, vec![0.05, 0.1, 0.2]).collect();

    assert_eq!(results.len(), 3);
    assert!(matches!(
      &results[0],
      Err(RiskError::FrontierPoint { target, source })
        if *target == 0.05 && matches!(**source, RiskError::InfeasibleConstraints(_))
    ));
    assert!(results[1].is_ok());
    assert!(matches!(
      &results[2],
      Err(RiskError::FrontierPoint { target, .. }) if *target == 0.2
    ));
    assert!(logs_contain("skipping frontier point"));
  }

  #[test]
  fn parallel_sweep_is_sorted_and_collects_failures() {
    let (mu, cov) = three_assets();
    let optimizer = PortfolioOptimizer::default();
    let targets = vec![0.11, 0.2, 0.09, 0.1, 0.05];
    let frontier = optimizer.frontier_par(&mu, &cov, &targets);

    let solved: Vec<f64> = frontier.points.iter().map(|p| p.target_return).collect();
    assert_eq!(solved, vec![0.09, 0.1, 0.11]);
    assert_eq!(frontier.failures.len(), 2);
  }

  #[test]
  fn lazy_and_parallel_sweeps_agree() {
    let (mu, cov) = three_assets();
    let optimizer = PortfolioOptimizer::default();
    let targets = linspace(0.095, 0.115, 3);

    let lazy: Vec<FrontierPoint> = optimizer
      .frontier(&mu, &cov, targets.clone())
      .solved()
      .collect();
    let par = optimizer.frontier_par(&mu, &cov, &targets);
    assert_eq!(lazy, par.points);
  }
}
