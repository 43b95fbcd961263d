//! # Portfolio Optimizer
//!
//! $$
//! \mathbf{w}^\* = \operatorname{Optimize}(\mu, \Sigma \mid l, u, r_f)
//! $$
//!
//! High-level API: a configured optimizer that solves the maximum Sharpe
//! portfolio and sweeps the efficient frontier.

use super::frontier::sweep_par;
use super::frontier::FrontierSweep;
use super::optimizers::maximize_sharpe;
use super::optimizers::minimize_variance_at;
use super::types::EfficientFrontier;
use super::types::FrontierPoint;
use super::types::PortfolioResult;
use super::types::WeightBounds;
use crate::error::Result;
use crate::stats::ReturnStatistics;

/// Runtime configuration for [`PortfolioOptimizer`].
#[derive(Clone, Debug)]
pub struct OptimizerConfig {
  /// Box constraints on each weight.
  pub bounds: WeightBounds,
  /// Risk-free rate subtracted in the Sharpe numerator.
  pub risk_free: f64,
  /// Iteration cap per solve. Hitting it is a failure.
  pub max_iters: u64,
  /// Standard-deviation tolerance of the simplex cost values.
  pub tolerance: f64,
  /// Weight of the distance-to-feasible-set penalty.
  pub penalty: f64,
  /// Edge length of the initial simplex.
  pub simplex_step: f64,
}

impl Default for OptimizerConfig {
  fn default() -> Self {
    Self {
      bounds: WeightBounds::default(),
      risk_free: 0.0,
      max_iters: 5000,
      tolerance: 1e-12,
      penalty: 1.0,
      simplex_step: 0.1,
    }
  }
}

/// Sharpe-ratio optimizer and efficient-frontier solver.
#[derive(Clone, Debug, Default)]
pub struct PortfolioOptimizer {
  config: OptimizerConfig,
}

impl PortfolioOptimizer {
  /// Construct an optimizer with explicit configuration.
  pub fn new(config: OptimizerConfig) -> Self {
    Self { config }
  }

  /// Borrow optimizer configuration.
  pub fn config(&self) -> &OptimizerConfig {
    &self.config
  }

  /// Maximum Sharpe portfolio for estimated return statistics.
  pub fn max_sharpe(&self, stats: &ReturnStatistics) -> Result<PortfolioResult> {
    self.optimize(&stats.mean, &stats.covariance)
  }

  /// Maximum Sharpe portfolio for explicit `mu` and `cov`.
  pub fn optimize(&self, mu: &[f64], cov: &[Vec<f64>]) -> Result<PortfolioResult> {
    maximize_sharpe(mu, cov, &self.config)
  }

  /// Minimum-variance portfolio earning exactly `target`.
  pub fn min_variance_for_target(
    &self,
    mu: &[f64],
    cov: &[Vec<f64>],
    target: f64,
  ) -> Result<FrontierPoint> {
    minimize_variance_at(mu, cov, target, &self.config)
  }

  /// Lazily solve one frontier point per target, in the given order.
  ///
  /// Failed targets are yielded as [`crate::RiskError::FrontierPoint`] and do
  /// not stop the sweep.
  pub fn frontier<'a, I>(
    &'a self,
    mu: &'a [f64],
    cov: &'a [Vec<f64>],
    targets: I,
  ) -> FrontierSweep<'a, I::IntoIter>
  where
    I: IntoIterator<Item = f64>,
  {
    FrontierSweep::new(mu, cov, &self.config, targets.into_iter())
  }

  /// Solve all targets on the rayon pool. Points come back sorted by target.
  pub fn frontier_par(&self, mu: &[f64], cov: &[Vec<f64>], targets: &[f64]) -> EfficientFrontier {
    sweep_par(mu, cov, targets, &self.config)
  }
}
