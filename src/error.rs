//! # Errors
//!
//! $$
//! f:\ \text{inputs}\to\text{Result}\langle T,\ \text{RiskError}\rangle
//! $$
//!
//! Typed failures shared by the statistics, optimizer, simulator and risk
//! estimator. None of them are recovered internally; the caller decides
//! whether to retry with different inputs or abort.

use thiserror::Error;

/// Errors raised by the numerical core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RiskError {
  /// Not enough observations to form the requested statistic.
  #[error("insufficient data: need at least {required} observations, got {actual}")]
  InsufficientData { required: usize, actual: usize },

  /// A price that cannot produce a percentage return.
  #[error("invalid price {price} at index {index} of asset {asset}")]
  InvalidPrice {
    asset: usize,
    index: usize,
    price: f64,
  },

  /// Portfolio volatility is zero so the Sharpe ratio is undefined.
  #[error("portfolio variance is degenerate (zero volatility)")]
  DegenerateVariance,

  /// The solver stopped before meeting its convergence criterion.
  #[error("optimization did not converge after {iterations} iterations")]
  DidNotConverge {
    iterations: u64,
    last_iterate: Vec<f64>,
  },

  /// A single efficient-frontier target could not be solved.
  #[error("frontier point at target return {target} failed: {source}")]
  FrontierPoint {
    target: f64,
    #[source]
    source: Box<RiskError>,
  },

  /// Cholesky decomposition rejected the joint covariance matrix.
  #[error("matrix is not positive definite")]
  NonPositiveDefinite,

  /// No samples were supplied to a risk measure.
  #[error("sample is empty")]
  EmptySample,

  /// Confidence level outside the open interval (0, 1).
  #[error("confidence level {0} is outside (0, 1)")]
  InvalidConfidenceLevel(f64),

  /// Vector or matrix dimensions disagree.
  #[error("dimension mismatch: expected {expected}, got {actual}")]
  DimensionMismatch { expected: usize, actual: usize },

  /// Bound, sum or target constraints admit no feasible weight vector.
  #[error("infeasible constraints: {0}")]
  InfeasibleConstraints(String),

  /// Parameter outside its valid domain.
  #[error("invalid parameter: {0}")]
  InvalidParameter(String),

  /// Any other failure reported by the optimization backend.
  #[error("solver failure: {0}")]
  Solver(String),
}

impl RiskError {
  /// Wrap `self` as the cause of a failed frontier point.
  pub fn at_target(self, target: f64) -> Self {
    RiskError::FrontierPoint {
      target,
      source: Box::new(self),
    }
  }

  /// Recover a typed error that travelled through argmin's `anyhow` error.
  pub(crate) fn from_solver(err: argmin::core::Error) -> Self {
    match err.downcast::<RiskError>() {
      Ok(typed) => typed,
      Err(other) => RiskError::Solver(other.to_string()),
    }
  }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, RiskError>;
