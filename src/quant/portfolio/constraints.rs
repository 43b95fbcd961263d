//! # Weight Constraints
//!
//! $$
//! P(\mathbf{x})=\operatorname{clip}_{[l,u]}\big(\mathbf{x}-a\mathbf{1}-b\mu\big),\quad
//! \mathbf{1}^\top P(\mathbf{x})=1,\ \mu^\top P(\mathbf{x})=r^\*
//! $$
//!
//! Euclidean projection onto the feasible weight set. The shifts `a` and `b`
//! are the dual multipliers of the two equality constraints; each one is found
//! by bisection because the constrained sums are monotone in it.

use crate::error::Result;
use crate::error::RiskError;

const MAX_BISECTION_STEPS: usize = 200;
const MAX_BRACKET_DOUBLINGS: usize = 60;
/// Slack allowed when comparing a constraint against its bound.
pub(crate) const FEASIBILITY_TOL: f64 = 1e-9;

#[derive(Clone, Debug)]
struct TargetReturn {
  mu: Vec<f64>,
  target: f64,
}

/// Candidate with the smallest return-constraint gap seen so far.
struct Closest {
  gap: f64,
  w: Vec<f64>,
  tol: f64,
}

impl Closest {
  fn new(tol: f64) -> Self {
    Self {
      gap: f64::INFINITY,
      w: Vec::new(),
      tol,
    }
  }

  /// Record `w` if it beats the current best; `true` once the gap is within tolerance.
  fn offer(&mut self, g: f64, w: Vec<f64>) -> bool {
    if g.abs() < self.gap {
      self.gap = g.abs();
      self.w = w;
    }
    self.gap <= self.tol
  }
}

/// `{ w : Σw = 1, l <= w <= u }`, optionally intersected with `{ w : μ'w = r* }`.
#[derive(Clone, Debug)]
pub(crate) struct FeasibleSet {
  lower: Vec<f64>,
  upper: Vec<f64>,
  target: Option<TargetReturn>,
}

impl FeasibleSet {
  pub(crate) fn new(lower: Vec<f64>, upper: Vec<f64>) -> Result<Self> {
    if lower.len() != upper.len() {
      return Err(RiskError::DimensionMismatch {
        expected: lower.len(),
        actual: upper.len(),
      });
    }

    let lo_sum: f64 = lower.iter().sum();
    let hi_sum: f64 = upper.iter().sum();
    if lo_sum > 1.0 + FEASIBILITY_TOL || hi_sum < 1.0 - FEASIBILITY_TOL {
      return Err(RiskError::InfeasibleConstraints(format!(
        "weights bounded to sum within [{lo_sum}, {hi_sum}] cannot sum to one"
      )));
    }

    Ok(Self {
      lower,
      upper,
      target: None,
    })
  }

  /// Add the equality `μ'w = target`, rejecting targets outside the
  /// attainable return range.
  pub(crate) fn with_target_return(mut self, mu: &[f64], target: f64) -> Result<Self> {
    if mu.len() != self.lower.len() {
      return Err(RiskError::DimensionMismatch {
        expected: self.lower.len(),
        actual: mu.len(),
      });
    }
    if !target.is_finite() {
      return Err(RiskError::InvalidParameter(format!(
        "target return must be finite, got {target}"
      )));
    }

    let (min_ret, max_ret) = self.return_range(mu);
    if target < min_ret - FEASIBILITY_TOL || target > max_ret + FEASIBILITY_TOL {
      return Err(RiskError::InfeasibleConstraints(format!(
        "target return {target} outside attainable range [{min_ret}, {max_ret}]"
      )));
    }

    self.target = Some(TargetReturn {
      mu: mu.to_vec(),
      target,
    });
    Ok(self)
  }

  pub(crate) fn dim(&self) -> usize {
    self.lower.len()
  }

  /// Lowest and highest `μ'w` over the sum and box constraints.
  fn return_range(&self, mu: &[f64]) -> (f64, f64) {
    let mut order: Vec<usize> = (0..mu.len()).collect();
    order.sort_by(|&a, &b| mu[a].total_cmp(&mu[b]));

    let min_ret = self.greedy_return(mu, order.iter().copied());
    let max_ret = self.greedy_return(mu, order.iter().rev().copied());
    (min_ret, max_ret)
  }

  /// Start every weight at its lower bound and hand the remaining budget to
  /// assets in `order` until it is spent.
  fn greedy_return(&self, mu: &[f64], order: impl Iterator<Item = usize>) -> f64 {
    let mut w = self.lower.clone();
    let mut budget = 1.0 - self.lower.iter().sum::<f64>();
    for i in order {
      let add = budget.min(self.upper[i] - self.lower[i]).max(0.0);
      w[i] += add;
      budget -= add;
    }
    w.iter().zip(mu.iter()).map(|(a, b)| a * b).sum()
  }

  fn clip(&self, x: &[f64], a: f64, b: f64, mu: Option<&[f64]>) -> Vec<f64> {
    x.iter()
      .enumerate()
      .map(|(i, &xi)| {
        let shift = a + mu.map(|m| b * m[i]).unwrap_or(0.0);
        (xi - shift).clamp(self.lower[i], self.upper[i])
      })
      .collect()
  }

  /// Shift `a` such that the clipped weights sum to one.
  fn sum_shift(&self, x: &[f64], b: f64, mu: Option<&[f64]>) -> f64 {
    let shifted = |i: usize| x[i] - mu.map(|m| b * m[i]).unwrap_or(0.0);
    let n = x.len();

    // At `lo` every weight sits on its upper bound, at `hi` on its lower bound.
    let mut lo = (0..n)
      .map(|i| shifted(i) - self.upper[i])
      .fold(f64::INFINITY, f64::min);
    let mut hi = (0..n)
      .map(|i| shifted(i) - self.lower[i])
      .fold(f64::NEG_INFINITY, f64::max);

    for _ in 0..MAX_BISECTION_STEPS {
      let mid = 0.5 * (lo + hi);
      if mid <= lo || mid >= hi {
        break;
      }
      let s: f64 = self.clip(x, mid, b, mu).iter().sum();
      if s > 1.0 {
        lo = mid;
      } else {
        hi = mid;
      }
    }

    0.5 * (lo + hi)
  }

  fn project_with_return(&self, x: &[f64], tr: &TargetReturn) -> Vec<f64> {
    let mu = Some(tr.mu.as_slice());
    let excess = |b: f64| -> (f64, Vec<f64>) {
      let a = self.sum_shift(x, b, mu);
      let w = self.clip(x, a, b, mu);
      let ret: f64 = w.iter().zip(tr.mu.iter()).map(|(wi, mi)| wi * mi).sum();
      (ret - tr.target, w)
    };

    let spread = tr
      .mu
      .iter()
      .fold(f64::NEG_INFINITY, |acc, &m| acc.max(m))
      - tr.mu.iter().fold(f64::INFINITY, |acc, &m| acc.min(m));
    if spread < 1e-15 {
      // Every sum-one portfolio earns the common mean.
      return excess(0.0).1;
    }

    let mut best = Closest::new(1e-15 * (1.0 + tr.target.abs()));

    // The return of the projection is non-increasing in `b`.
    let mut b_lo = -1.0 / spread;
    let mut b_hi = 1.0 / spread;
    let (mut g_lo, w_lo) = excess(b_lo);
    let (mut g_hi, w_hi) = excess(b_hi);
    if best.offer(g_lo, w_lo) || best.offer(g_hi, w_hi) {
      return best.w;
    }

    for _ in 0..MAX_BRACKET_DOUBLINGS {
      if g_lo >= 0.0 && g_hi <= 0.0 {
        break;
      }
      if g_lo < 0.0 {
        b_lo *= 2.0;
        let (g, w) = excess(b_lo);
        g_lo = g;
        if best.offer(g, w) {
          return best.w;
        }
      }
      if g_hi > 0.0 {
        b_hi *= 2.0;
        let (g, w) = excess(b_hi);
        g_hi = g;
        if best.offer(g, w) {
          return best.w;
        }
      }
    }

    if g_lo < 0.0 || g_hi > 0.0 {
      return best.w;
    }

    for _ in 0..MAX_BISECTION_STEPS {
      let mid = 0.5 * (b_lo + b_hi);
      if mid <= b_lo || mid >= b_hi {
        break;
      }
      let (g, w) = excess(mid);
      if best.offer(g, w) {
        break;
      }
      if g > 0.0 {
        b_lo = mid;
      } else {
        b_hi = mid;
      }
    }

    best.w
  }

  /// Closest feasible weight vector to `x`.
  pub(crate) fn project(&self, x: &[f64]) -> Vec<f64> {
    match &self.target {
      Some(tr) => self.project_with_return(x, tr),
      None => {
        let a = self.sum_shift(x, 0.0, None);
        self.clip(x, a, 0.0, None)
      }
    }
  }

  /// Largest violation of the equality constraints at `w`.
  pub(crate) fn residual(&self, w: &[f64]) -> f64 {
    let sum_res = (w.iter().sum::<f64>() - 1.0).abs();
    let ret_res = self
      .target
      .as_ref()
      .map(|tr| {
        let ret: f64 = w.iter().zip(tr.mu.iter()).map(|(a, b)| a * b).sum();
        (ret - tr.target).abs()
      })
      .unwrap_or(0.0);
    sum_res.max(ret_res)
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;

  fn long_only(n: usize) -> FeasibleSet {
    FeasibleSet::new(vec![0.0; n], vec![1.0; n]).unwrap()
  }

  #[test]
  fn projection_lands_on_simplex() {
    let set = long_only(3);
    for x in [
      vec![0.2, 0.3, 0.5],
      vec![3.0, -1.0, 0.4],
      vec![-5.0, -5.0, -5.0],
      vec![0.9, 0.9, 0.9],
    ] {
      let w = set.project(&x);
      assert_abs_diff_eq!(w.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
      assert!(w.iter().all(|&wi| (0.0..=1.0).contains(&wi)));
    }
  }

  #[test]
  fn feasible_point_is_fixed() {
    let set = long_only(3);
    let x = vec![0.2, 0.3, 0.5];
    let w = set.project(&x);
    for i in 0..3 {
      assert_abs_diff_eq!(w[i], x[i], epsilon = 1e-12);
    }
  }

  #[test]
  fn projection_respects_tight_upper_bounds() {
    let set = FeasibleSet::new(vec![0.0; 3], vec![0.4; 3]).unwrap();
    let w = set.project(&[1.0, 0.0, 0.0]);
    assert_abs_diff_eq!(w[0], 0.4, epsilon = 1e-12);
    assert_abs_diff_eq!(w[1], 0.3, epsilon = 1e-12);
    assert_abs_diff_eq!(w[2], 0.3, epsilon = 1e-12);
  }

  #[test]
  fn bounds_that_cannot_sum_to_one_are_infeasible() {
    assert!(matches!(
      FeasibleSet::new(vec![0.0; 2], vec![0.3; 2]),
      Err(RiskError::InfeasibleConstraints(_))
    ));
    assert!(matches!(
      FeasibleSet::new(vec![0.6; 2], vec![1.0; 2]),
      Err(RiskError::InfeasibleConstraints(_))
    ));
  }

  #[test]
  fn target_projection_meets_both_equalities() {
    let mu = [0.08, 0.1, 0.12];
    let set = long_only(3).with_target_return(&mu, 0.105).unwrap();
    for x in [vec![1.0 / 3.0; 3], vec![1.0, 0.0, 0.0], vec![-2.0, 4.0, 0.5]] {
      let w = set.project(&x);
      assert!(set.residual(&w) < 1e-12, "residual {}", set.residual(&w));
      assert!(w.iter().all(|&wi| (-1e-15..=1.0 + 1e-15).contains(&wi)));
    }
  }

  #[test]
  fn target_at_the_attainable_edge_is_reachable() {
    let mu = [0.08, 0.1, 0.12];
    let set = long_only(3).with_target_return(&mu, 0.12).unwrap();
    let w = set.project(&[0.3, 0.3, 0.4]);
    assert!(set.residual(&w) < FEASIBILITY_TOL);
    assert_abs_diff_eq!(w[2], 1.0, epsilon = 1e-8);
  }

  #[test]
  fn unattainable_target_is_rejected() {
    let mu = [0.08, 0.1, 0.12];
    assert!(matches!(
      long_only(3).with_target_return(&mu, 0.2),
      Err(RiskError::InfeasibleConstraints(_))
    ));
    assert!(matches!(
      long_only(3).with_target_return(&mu, 0.05),
      Err(RiskError::InfeasibleConstraints(_))
    ));
  }
}
