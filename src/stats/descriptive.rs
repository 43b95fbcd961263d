//! # Descriptive Statistics
//!
//! $$
//! \bar x=\frac1n\sum_i x_i,\qquad
//! q_p = x_{(\lfloor h\rfloor)}
//! + (h-\lfloor h\rfloor)\,(x_{(\lceil h\rceil)}-x_{(\lfloor h\rfloor)}),
//! \ h=\tfrac{p}{100}(n-1)
//! $$
//!
//! Small slice helpers shared by return statistics and risk measures.

/// Arithmetic mean. Returns `0.0` for an empty slice.
pub fn mean(xs: &[f64]) -> f64 {
  if xs.is_empty() {
    0.0
  } else {
    xs.iter().sum::<f64>() / xs.len() as f64
  }
}

/// Population standard deviation (denominator `n`).
pub fn population_std(xs: &[f64]) -> f64 {
  if xs.is_empty() {
    return 0.0;
  }

  let m = mean(xs);
  let ss: f64 = xs.iter().map(|&x| (x - m).powi(2)).sum();
  (ss / xs.len() as f64).sqrt()
}

/// Sample covariance of two equally long series (denominator `n - 1`).
///
/// A single observation has no dispersion to estimate and yields `0.0`.
pub fn sample_covariance(x: &[f64], y: &[f64]) -> f64 {
  let n = x.len().min(y.len());
  if n < 2 {
    return 0.0;
  }

  let mx = mean(&x[..n]);
  let my = mean(&y[..n]);
  let mut acc = 0.0;
  for i in 0..n {
    acc += (x[i] - mx) * (y[i] - my);
  }
  acc / (n - 1) as f64
}

/// Returns the p-th percentile (0..100) of an ascending slice using linear
/// interpolation between closest ranks.
///
/// # Arguments
///
/// * `sorted_data` - Ascending, non-empty slice.
/// * `p`           - The percentile (0..100).
pub fn percentile(sorted_data: &[f64], p: f64) -> f64 {
  if sorted_data.is_empty() {
    return f64::NAN;
  }
  if p <= 0.0 {
    return sorted_data[0];
  }
  if p >= 100.0 {
    return sorted_data[sorted_data.len() - 1];
  }

  let rank = (p / 100.0) * (sorted_data.len() as f64 - 1.0);
  let lower_index = rank.floor() as usize;
  let upper_index = rank.ceil() as usize;

  if lower_index == upper_index {
    sorted_data[lower_index]
  } else {
    let weight = rank - lower_index as f64;
    let lower_val = sorted_data[lower_index];
    let upper_val = sorted_data[upper_index];
    lower_val + weight * (upper_val - lower_val)
  }
}

/// Sorted copy of `xs` in ascending order.
pub(crate) fn sorted(xs: &[f64]) -> Vec<f64> {
  let mut out = xs.to_vec();
  out.sort_by(|a, b| a.total_cmp(b));
  out
}
