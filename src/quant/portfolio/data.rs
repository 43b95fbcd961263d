//! # Portfolio Data Utilities
//!
//! $$
//! \Sigma_{ij} = \sigma_i \sigma_j \rho_{ij}
//! $$
//!
//! Linear-algebra helpers on `Vec<Vec<f64>>` matrices plus
//! correlation/covariance construction.

use crate::error::Result;
use crate::error::RiskError;
use crate::stats::sample_covariance;

pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
  a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

pub(crate) fn mat_vec_mul(mat: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
  mat
    .iter()
    .map(|row| row.iter().zip(v.iter()).map(|(a, b)| a * b).sum())
    .collect()
}

/// Quadratic form `w' Σ w`.
pub fn portfolio_variance(w: &[f64], cov: &[Vec<f64>]) -> f64 {
  dot(w, &mat_vec_mul(cov, w))
}

/// Check that `mat` is `n x n`.
pub(crate) fn ensure_square(mat: &[Vec<f64>], n: usize) -> Result<()> {
  if mat.len() != n {
    return Err(RiskError::DimensionMismatch {
      expected: n,
      actual: mat.len(),
    });
  }
  if let Some(row) = mat.iter().find(|row| row.len() != n) {
    return Err(RiskError::DimensionMismatch {
      expected: n,
      actual: row.len(),
    });
  }
  Ok(())
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
  let scale = (sample_covariance(x, x) * sample_covariance(y, y)).sqrt();
  if scale < 1e-15 {
    return 0.0;
  }
  (sample_covariance(x, y) / scale).clamp(-1.0, 1.0)
}

/// Pearson correlation matrix of aligned return series.
///
/// A series without dispersion is reported as uncorrelated with every other.
pub fn correlation_matrix<S: AsRef<[f64]>>(series: &[S]) -> Vec<Vec<f64>> {
  let n = series.len();
  let mut corr = vec![vec![1.0; n]; n];
  for i in 0..n {
    for j in (i + 1)..n {
      let r = pearson(series[i].as_ref(), series[j].as_ref());
      corr[i][j] = r;
      corr[j][i] = r;
    }
  }
  corr
}

/// `Σ = diag(σ) ρ diag(σ)`. Missing correlation entries count as identity.
pub fn covariance_matrix(sigmas: &[f64], corr: &[Vec<f64>]) -> Vec<Vec<f64>> {
  sigmas
    .iter()
    .enumerate()
    .map(|(i, si)| {
      sigmas
        .iter()
        .enumerate()
        .map(|(j, sj)| {
          let rho = corr
            .get(i)
            .and_then(|row| row.get(j))
            .copied()
            .unwrap_or(if i == j { 1.0 } else { 0.0 });
          si * sj * rho
        })
        .collect()
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;

  #[test]
  fn covariance_matrix_handles_missing_corr_entries() {
    let sigmas = vec![0.2, 0.3];
    let corr = vec![vec![1.0]];
    let cov = covariance_matrix(&sigmas, &corr);

    assert_eq!(cov.len(), 2);
    assert!((cov[0][0] - 0.04).abs() < 1e-12);
    assert!((cov[1][1] - 0.09).abs() < 1e-12);
    assert!(cov[0][1].abs() < 1e-12);
  }

  #[test]
  fn flat_series_is_uncorrelated() {
    let corr = correlation_matrix(&[vec![0.01, 0.01, 0.01], vec![0.02, -0.01, 0.03]]);
    assert_eq!(corr[0][1], 0.0);
    assert_eq!(corr[1][1], 1.0);
  }

  #[test]
  fn perfectly_correlated_series_have_unit_correlation() {
    let a = vec![0.01, -0.02, 0.03, 0.0];
    let b: Vec<f64> = a.iter().map(|x| 2.0 * x + 0.001).collect();
    let corr = correlation_matrix(&[a, b]);
    assert_abs_diff_eq!(corr[0][1], 1.0, epsilon = 1e-12);
  }

  #[test]
  fn ensure_square_reports_bad_row() {
    let m = vec![vec![1.0, 0.0], vec![0.0]];
    assert_eq!(
      ensure_square(&m, 2),
      Err(RiskError::DimensionMismatch {
        expected: 2,
        actual: 1
      })
    );
    assert_abs_diff_eq!(
      portfolio_variance(&[0.5, 0.5], &[vec![0.04, 0.0], vec![0.0, 0.04]]),
      0.02,
      epsilon = 1e-15
    );
  }
}
