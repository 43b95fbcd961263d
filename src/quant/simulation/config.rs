//! # Simulation Configuration
//!
//! $$
//! \Theta = \big(V_0,\ C,\ \Sigma_V,\ T,\ N_{\text{sim}}\big)
//! $$
//!
//! Inputs of the correlated return simulator, built by constructor plus
//! `with_*` builders and validated before any draw.

use crate::error::Result;
use crate::error::RiskError;
use crate::quant::portfolio::data::ensure_square;

const SYMMETRY_TOL: f64 = 1e-12;

/// Configuration of a Monte-Carlo run of correlated asset log-returns.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
  /// Current value of each asset.
  pub asset_values: Vec<f64>,
  /// Asset correlation matrix (symmetric, unit diagonal).
  pub correlation: Vec<Vec<f64>>,
  /// Volatility matrix. Its diagonal is the per-asset volatility.
  pub volatility: Vec<Vec<f64>>,
  /// Horizon in years.
  pub time_horizon: f64,
  /// Number of simulated paths.
  pub num_simulations: usize,
  /// Notional applied to the summed asset returns. Defaults to the total asset value.
  pub portfolio_value: Option<f64>,
  /// Seed for reproducible draws. `None` draws fresh entropy on every run.
  pub seed: Option<u64>,
}

fn diagonal(values: &[f64]) -> Vec<Vec<f64>> {
  let n = values.len();
  let mut m = vec![vec![0.0; n]; n];
  for (i, &v) in values.iter().enumerate() {
    m[i][i] = v;
  }
  m
}

impl SimulationConfig {
  /// One-year horizon with a diagonal volatility matrix built from `volatilities`.
  pub fn new(
    asset_values: Vec<f64>,
    volatilities: Vec<f64>,
    correlation: Vec<Vec<f64>>,
    num_simulations: usize,
  ) -> Self {
    Self {
      asset_values,
      volatility: diagonal(&volatilities),
      correlation,
      time_horizon: 1.0,
      num_simulations,
      portfolio_value: None,
      seed: None,
    }
  }

  pub fn with_seed(mut self, seed: u64) -> Self {
    self.seed = Some(seed);
    self
  }

  pub fn with_time_horizon(mut self, years: f64) -> Self {
    self.time_horizon = years;
    self
  }

  /// Replace the diagonal volatility with a full matrix.
  pub fn with_volatility_matrix(mut self, volatility: Vec<Vec<f64>>) -> Self {
    self.volatility = volatility;
    self
  }

  pub fn with_portfolio_value(mut self, value: f64) -> Self {
    self.portfolio_value = Some(value);
    self
  }

  pub fn n_assets(&self) -> usize {
    self.asset_values.len()
  }

  /// Per-asset volatility, the diagonal of the volatility matrix.
  pub fn volatilities(&self) -> Vec<f64> {
    (0..self.n_assets())
      .map(|i| {
        self
          .volatility
          .get(i)
          .and_then(|row| row.get(i))
          .copied()
          .unwrap_or(0.0)
      })
      .collect()
  }

  /// Notional of the simulated portfolio.
  pub fn portfolio_value(&self) -> f64 {
    self
      .portfolio_value
      .unwrap_or_else(|| self.asset_values.iter().sum())
  }

  /// Check shapes and parameter domains.
  pub fn validate(&self) -> Result<()> {
    let n = self.n_assets();
    if n == 0 {
      return Err(RiskError::InsufficientData {
        required: 1,
        actual: 0,
      });
    }

    for (asset, &value) in self.asset_values.iter().enumerate() {
      if !value.is_finite() || value <= 0.0 {
        return Err(RiskError::InvalidPrice {
          asset,
          index: 0,
          price: value,
        });
      }
    }

    ensure_square(&self.correlation, n)?;
    ensure_square(&self.volatility, n)?;

    for i in 0..n {
      if (self.correlation[i][i] - 1.0).abs() > SYMMETRY_TOL {
        return Err(RiskError::InvalidParameter(format!(
          "correlation diagonal must be 1, got {} at {i}",
          self.correlation[i][i]
        )));
      }
      for j in 0..n {
        let c = self.correlation[i][j];
        if !c.is_finite() || c.abs() > 1.0 + SYMMETRY_TOL {
          return Err(RiskError::InvalidParameter(format!(
            "correlation entry ({i}, {j}) = {c} outside [-1, 1]"
          )));
        }
        if (c - self.correlation[j][i]).abs() > SYMMETRY_TOL {
          return Err(RiskError::InvalidParameter(
            "correlation matrix must be symmetric".to_string(),
          ));
        }
        if !self.volatility[i][j].is_finite() {
          return Err(RiskError::InvalidParameter(
            "volatility matrix must be finite".to_string(),
          ));
        }
      }
      if self.volatility[i][i] < 0.0 {
        return Err(RiskError::InvalidParameter(format!(
          "volatility of asset {i} is negative"
        )));
      }
    }

    if !self.time_horizon.is_finite() || self.time_horizon <= 0.0 {
      return Err(RiskError::InvalidParameter(format!(
        "time horizon must be positive, got {}",
        self.time_horizon
      )));
    }
    if self.num_simulations == 0 {
      return Err(RiskError::InvalidParameter(
        "number of simulations must be positive".to_string(),
      ));
    }
    if let Some(value) = self.portfolio_value {
      if !value.is_finite() {
        return Err(RiskError::InvalidParameter(
          "portfolio value must be finite".to_string(),
        ));
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn two_assets() -> SimulationConfig {
    SimulationConfig::new(
      vec![500_000.0, 500_000.0],
      vec![0.2, 0.15],
      vec![vec![1.0, 0.8], vec![0.8, 1.0]],
      10_000,
    )
  }

  #[test]
  fn defaults_follow_asset_values() {
    let config = two_assets();
    assert_eq!(config.portfolio_value(), 1_000_000.0);
    assert_eq!(config.volatilities(), vec![0.2, 0.15]);
    assert_eq!(config.time_horizon, 1.0);
    assert!(config.validate().is_ok());
  }

  #[test]
  fn builders_override_fields() {
    let config = two_assets()
      .with_seed(7)
      .with_time_horizon(0.5)
      .with_portfolio_value(2.0)
      .with_volatility_matrix(vec![vec![0.2, 0.1], vec![0.1, 0.15]]);
    assert_eq!(config.seed, Some(7));
    assert_eq!(config.time_horizon, 0.5);
    assert_eq!(config.portfolio_value(), 2.0);
    assert_eq!(config.volatility[0][1], 0.1);
    assert!(config.validate().is_ok());
  }

  #[test]
  fn asymmetric_correlation_is_rejected() {
    let mut config = two_assets();
    config.correlation[0][1] = 0.5;
    assert!(matches!(
      config.validate(),
      Err(RiskError::InvalidParameter(_))
    ));
  }

  #[test]
  fn non_positive_asset_value_is_rejected() {
    let mut config = two_assets();
    config.asset_values[1] = 0.0;
    assert_eq!(
      config.validate(),
      Err(RiskError::InvalidPrice {
        asset: 1,
        index: 0,
        price: 0.0
      })
    );
  }

  #[test]
  fn shape_and_domain_checks() {
    let config = two_assets().with_volatility_matrix(vec![vec![0.2]]);
    assert!(matches!(
      config.validate(),
      Err(RiskError::DimensionMismatch { .. })
    ));
    assert!(two_assets().with_time_horizon(0.0).validate().is_err());

    let mut empty = two_assets();
    empty.num_simulations = 0;
    assert!(empty.validate().is_err());
  }
}
