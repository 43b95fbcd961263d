//! # Portfolio Types
//!
//! $$
//! \mathbf{w}^\*=\arg\max_{\mathbf{w}} \frac{\mathbb E[R_p]-r_f}{\sigma_p},\quad
//! \textstyle\sum_i w_i=1,\ l_i\le w_i\le u_i
//! $$
//!
//! Shared bound definitions and result containers for portfolio optimization.

use crate::error::Result;
use crate::error::RiskError;

/// Per-asset box constraints on portfolio weights.
#[derive(Clone, Debug, PartialEq)]
pub enum WeightBounds {
  /// Same `(lower, upper)` bounds for every asset.
  Uniform(f64, f64),
  /// One `(lower, upper)` pair per asset.
  PerAsset(Vec<(f64, f64)>),
}

impl Default for WeightBounds {
  /// Long-only, no leverage.
  fn default() -> Self {
    Self::Uniform(0.0, 1.0)
  }
}

impl WeightBounds {
  /// Expand into lower and upper bound vectors for `n` assets.
  pub fn resolve(&self, n: usize) -> Result<(Vec<f64>, Vec<f64>)> {
    let pairs = match self {
      Self::Uniform(lo, hi) => vec![(*lo, *hi); n],
      Self::PerAsset(pairs) => {
        if pairs.len() != n {
          return Err(RiskError::DimensionMismatch {
            expected: n,
            actual: pairs.len(),
          });
        }
        pairs.clone()
      }
    };

    for (i, &(lo, hi)) in pairs.iter().enumerate() {
      if !lo.is_finite() || !hi.is_finite() || lo > hi {
        return Err(RiskError::InvalidParameter(format!(
          "weight bounds of asset {i} must be finite with lower <= upper, got [{lo}, {hi}]"
        )));
      }
    }

    Ok(pairs.into_iter().unzip())
  }
}

/// Output of a Sharpe-ratio optimization run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PortfolioResult {
  /// Final portfolio weights, summing to one.
  pub weights: Vec<f64>,
  /// Model expected portfolio return `w'μ`.
  pub expected_return: f64,
  /// Model portfolio volatility `sqrt(w'Σw)`.
  pub volatility: f64,
  /// Sharpe ratio computed as `(expected_return - risk_free) / volatility`.
  pub sharpe: f64,
  /// Solver iterations used.
  pub iterations: u64,
}

/// Minimum-variance portfolio for one target return.
#[derive(Clone, Debug, PartialEq)]
pub struct FrontierPoint {
  /// Requested portfolio return.
  pub target_return: f64,
  /// Volatility of the minimum-variance portfolio at that return.
  pub volatility: f64,
  /// Weights of that portfolio.
  pub weights: Vec<f64>,
}

/// Collected outcome of a frontier sweep.
#[derive(Clone, Debug, Default)]
pub struct EfficientFrontier {
  /// Solved points ordered by target return.
  pub points: Vec<FrontierPoint>,
  /// One [`RiskError::FrontierPoint`] per target that could not be solved.
  pub failures: Vec<RiskError>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_bounds_are_long_only() {
    let (lo, hi) = WeightBounds::default().resolve(3).unwrap();
    assert_eq!(lo, vec![0.0; 3]);
    assert_eq!(hi, vec![1.0; 3]);
  }

  #[test]
  fn per_asset_bounds_must_match_asset_count() {
    let bounds = WeightBounds::PerAsset(vec![(0.0, 0.5)]);
    assert_eq!(
      bounds.resolve(2),
      Err(RiskError::DimensionMismatch {
        expected: 2,
        actual: 1
      })
    );
  }

  #[test]
  fn inverted_bounds_are_invalid() {
    assert!(matches!(
      WeightBounds::Uniform(0.6, 0.4).resolve(2),
      Err(RiskError::InvalidParameter(_))
    ));
  }
}
