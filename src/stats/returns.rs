//! # Return Statistics
//!
//! $$
//! \mu_i=\frac1T\sum_t r_{i,t},\qquad
//! \Sigma_{ij}=\frac{1}{T-1}\sum_t (r_{i,t}-\mu_i)(r_{j,t}-\mu_j)
//! $$
//!
//! Period-over-period percentage returns and their first two moments.

use super::descriptive::mean;
use super::descriptive::sample_covariance;
use crate::error::Result;
use crate::error::RiskError;
use crate::quant::portfolio::data::correlation_matrix;
use crate::quant::portfolio::data::covariance_matrix;

/// Percentage returns of a single asset, `r[t] = p[t] / p[t-1] - 1`.
#[derive(Clone, Debug, PartialEq)]
pub struct ReturnSeries {
  values: Vec<f64>,
}

impl AsRef<[f64]> for ReturnSeries {
  fn as_ref(&self) -> &[f64] {
    &self.values
  }
}

impl ReturnSeries {
  /// Build the return series of asset `0` from an ordered price sequence.
  pub fn from_prices(prices: &[f64]) -> Result<Self> {
    Self::from_asset_prices(0, prices)
  }

  /// Same as [`ReturnSeries::from_prices`] but tags errors with `asset`.
  pub fn from_asset_prices(asset: usize, prices: &[f64]) -> Result<Self> {
    if prices.len() < 2 {
      return Err(RiskError::InsufficientData {
        required: 2,
        actual: prices.len(),
      });
    }

    if let Some((index, &price)) = prices
      .iter()
      .enumerate()
      .find(|(_, p)| !(p.is_finite() && **p > 0.0))
    {
      return Err(RiskError::InvalidPrice {
        asset,
        index,
        price,
      });
    }

    let values = prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect();
    Ok(Self { values })
  }

  pub fn as_slice(&self) -> &[f64] {
    &self.values
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  pub fn mean(&self) -> f64 {
    mean(&self.values)
  }
}

/// Mean vector and covariance matrix of aligned asset returns.
#[derive(Clone, Debug, PartialEq)]
pub struct ReturnStatistics {
  /// Mean per-period return of each asset.
  pub mean: Vec<f64>,
  /// Sample covariance matrix (N x N).
  pub covariance: Vec<Vec<f64>>,
  /// Pearson correlation matrix (N x N).
  pub correlation: Vec<Vec<f64>>,
}

impl ReturnStatistics {
  /// Compute statistics from one ordered price sequence per asset.
  ///
  /// Every asset must cover the same periods, so all sequences must share
  /// the length of the first one.
  pub fn from_prices(prices: &[Vec<f64>]) -> Result<Self> {
    let expected = prices.first().map(|p| p.len()).unwrap_or(0);
    let mut series = Vec::with_capacity(prices.len());

    for (asset, p) in prices.iter().enumerate() {
      if p.len() != expected {
        return Err(RiskError::DimensionMismatch {
          expected,
          actual: p.len(),
        });
      }
      series.push(ReturnSeries::from_asset_prices(asset, p)?);
    }

    Self::from_returns(&series)
  }

  /// Compute statistics from already aligned return series.
  pub fn from_returns(series: &[ReturnSeries]) -> Result<Self> {
    if series.is_empty() {
      return Err(RiskError::InsufficientData {
        required: 1,
        actual: 0,
      });
    }

    let t = series[0].len();
    if let Some(bad) = series.iter().find(|s| s.len() != t) {
      return Err(RiskError::DimensionMismatch {
        expected: t,
        actual: bad.len(),
      });
    }
    if t == 0 {
      return Err(RiskError::InsufficientData {
        required: 1,
        actual: 0,
      });
    }

    let mean = series.iter().map(ReturnSeries::mean).collect();
    let sigmas: Vec<f64> = series
      .iter()
      .map(|s| sample_covariance(s.as_slice(), s.as_slice()).max(0.0).sqrt())
      .collect();
    let correlation = correlation_matrix(series);
    let covariance = covariance_matrix(&sigmas, &correlation);

    Ok(Self {
      mean,
      covariance,
      correlation,
    })
  }

  /// Number of assets.
  pub fn n_assets(&self) -> usize {
    self.mean.len()
  }

  /// Per-asset return volatility, `sqrt(diag(Σ))`.
  pub fn volatilities(&self) -> Vec<f64> {
    (0..self.n_assets())
      .map(|i| self.covariance[i][i].max(0.0).sqrt())
      .collect()
  }
}
