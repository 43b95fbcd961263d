//! # Portfolio Optimizers
//!
//! $$
//! \min_{\mathbf{x}}\ f\big(P(\mathbf{x})\big) + \kappa\,\lVert \mathbf{x}-P(\mathbf{x})\rVert^2
//! $$
//!
//! Nelder-Mead searches over unconstrained parameters `x`; every evaluation
//! projects `x` onto the feasible weight set `P`, so all iterates satisfy the
//! sum and box constraints exactly. The distance penalty keeps `x` anchored to
//! the set. Solves that stop on the iteration cap are reported as failures.

use argmin::core::CostFunction;
use argmin::core::Executor;
use argmin::core::State;
use argmin::core::TerminationReason;
use argmin::solver::neldermead::NelderMead;
use tracing::debug;
use tracing::warn;

use super::constraints::FeasibleSet;
use super::constraints::FEASIBILITY_TOL;
use super::data::dot;
use super::data::ensure_square;
use super::data::portfolio_variance;
use super::engine::OptimizerConfig;
use super::types::FrontierPoint;
use super::types::PortfolioResult;
use crate::error::Result;
use crate::error::RiskError;

/// Volatility at or below which the Sharpe ratio is treated as undefined.
pub const MIN_VOLATILITY: f64 = 1e-15;

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
  a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

fn validate_inputs(mu: &[f64], cov: &[Vec<f64>]) -> Result<()> {
  let n = mu.len();
  if n == 0 {
    return Err(RiskError::InsufficientData {
      required: 1,
      actual: 0,
    });
  }
  ensure_square(cov, n)?;

  let finite = mu.iter().all(|v| v.is_finite()) && cov.iter().flatten().all(|v| v.is_finite());
  if !finite {
    return Err(RiskError::InvalidParameter(
      "mean returns and covariance must be finite".to_string(),
    ));
  }
  Ok(())
}

/// Negative Sharpe ratio of the projected weights.
struct SharpeCost {
  mu: Vec<f64>,
  cov: Vec<Vec<f64>>,
  risk_free: f64,
  set: FeasibleSet,
  penalty: f64,
}

impl CostFunction for SharpeCost {
  type Param = Vec<f64>;
  type Output = f64;

  fn cost(&self, x: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
    let w = self.set.project(x);
    let vol = portfolio_variance(&w, &self.cov).max(0.0).sqrt();
    if !(vol > MIN_VOLATILITY) {
      return Err(RiskError::DegenerateVariance.into());
    }

    let sharpe = (dot(&w, &self.mu) - self.risk_free) / vol;
    Ok(-sharpe + self.penalty * squared_distance(x, &w))
  }
}

/// Portfolio variance of the projected weights.
struct VarianceCost {
  cov: Vec<Vec<f64>>,
  set: FeasibleSet,
  penalty: f64,
}

impl CostFunction for VarianceCost {
  type Param = Vec<f64>;
  type Output = f64;

  fn cost(&self, x: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
    let w = self.set.project(x);
    Ok(portfolio_variance(&w, &self.cov) + self.penalty * squared_distance(x, &w))
  }
}

fn initial_simplex(x0: &[f64], step: f64) -> Vec<Vec<f64>> {
  let mut simplex = Vec::with_capacity(x0.len() + 1);
  simplex.push(x0.to_vec());
  for i in 0..x0.len() {
    let mut point = x0.to_vec();
    point[i] += step;
    simplex.push(point);
  }
  simplex
}

/// Run Nelder-Mead from the projected equal-weight portfolio and return the
/// projected best parameters with the iteration count.
fn run_nelder_mead<C>(
  cost: C,
  set: &FeasibleSet,
  config: &OptimizerConfig,
) -> Result<(Vec<f64>, u64)>
where
  C: CostFunction<Param = Vec<f64>, Output = f64>,
{
  let n = set.dim();
  let x0 = set.project(&vec![1.0 / n as f64; n]);
  let simplex = initial_simplex(&x0, config.simplex_step);

  // Nelder-Mead unwraps the cost of every initial vertex, so failures there
  // are surfaced here instead.
  for vertex in &simplex {
    cost.cost(vertex).map_err(RiskError::from_solver)?;
  }

  let solver = NelderMead::new(simplex)
    .with_sd_tolerance(config.tolerance)
    .map_err(RiskError::from_solver)?;

  let res = Executor::new(cost, solver)
    .configure(|state| state.max_iters(config.max_iters))
    .run()
    .map_err(RiskError::from_solver)?;

  let state = res.state();
  let iterations = state.get_iter();
  let best = state
    .get_best_param()
    .cloned()
    .unwrap_or_else(|| x0.clone());
  let weights = set.project(&best);

  match state.get_termination_reason() {
    Some(TerminationReason::SolverConverged) => {
      debug!(
        iterations,
        cost = state.get_best_cost(),
        "nelder-mead converged"
      );
      Ok((weights, iterations))
    }
    reason => {
      warn!(iterations, ?reason, "nelder-mead stopped before converging");
      Err(RiskError::DidNotConverge {
        iterations,
        last_iterate: weights,
      })
    }
  }
}

/// Long-only (or box-bounded) maximum Sharpe-ratio portfolio.
///
/// A single asset leaves nothing to optimize and its Sharpe ratio is not a
/// meaningful objective, so `N = 1` is rejected as [`RiskError::DegenerateVariance`].
pub fn maximize_sharpe(
  mu: &[f64],
  cov: &[Vec<f64>],
  config: &OptimizerConfig,
) -> Result<PortfolioResult> {
  validate_inputs(mu, cov)?;
  let n = mu.len();
  if n == 1 {
    return Err(RiskError::DegenerateVariance);
  }

  let (lower, upper) = config.bounds.resolve(n)?;
  let set = FeasibleSet::new(lower, upper)?;

  let cost = SharpeCost {
    mu: mu.to_vec(),
    cov: cov.to_vec(),
    risk_free: config.risk_free,
    set: set.clone(),
    penalty: config.penalty,
  };

  let (weights, iterations) = run_nelder_mead(cost, &set, config)?;

  let expected_return = dot(&weights, mu);
  let volatility = portfolio_variance(&weights, cov).max(0.0).sqrt();
  if !(volatility > MIN_VOLATILITY) {
    return Err(RiskError::DegenerateVariance);
  }
  let sharpe = (expected_return - config.risk_free) / volatility;

  Ok(PortfolioResult {
    weights,
    expected_return,
    volatility,
    sharpe,
    iterations,
  })
}

/// Minimum-variance portfolio earning exactly `target` under the sum and box
/// constraints.
pub fn minimize_variance_at(
  mu: &[f64],
  cov: &[Vec<f64>],
  target: f64,
  config: &OptimizerConfig,
) -> Result<FrontierPoint> {
  validate_inputs(mu, cov)?;
  let (lower, upper) = config.bounds.resolve(mu.len())?;
  let set = FeasibleSet::new(lower, upper)?.with_target_return(mu, target)?;

  let cost = VarianceCost {
    cov: cov.to_vec(),
    set: set.clone(),
    penalty: config.penalty,
  };

  let (weights, _) = run_nelder_mead(cost, &set, config)?;

  if set.residual(&weights) > FEASIBILITY_TOL {
    return Err(RiskError::InfeasibleConstraints(format!(
      "target return {target} not attainable within tolerance"
    )));
  }

  let volatility = portfolio_variance(&weights, cov).max(0.0).sqrt();
  Ok(FrontierPoint {
    target_return: target,
    volatility,
    weights,
  })
}
