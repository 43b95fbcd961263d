//! # Risk Types
//!
//! $$
//! (\alpha,\ \text{metric},\ \text{value})
//! $$
//!
//! Every value is a signed portfolio return (or P&L) threshold in the lower
//! tail. Negative numbers are losses.

use std::fmt;

/// How a Value-at-Risk figure was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VarMethod {
  /// Normal quantile fitted to the sample mean and population std.
  Parametric,
  /// Empirical quantile of the sample.
  Historical,
}

/// Kind of risk measure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RiskMetric {
  VaR(VarMethod),
  ExpectedShortfall,
  /// Tail mean plus half the non-tail mean. Not the textbook CVaR.
  CVaR,
}

impl fmt::Display for RiskMetric {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RiskMetric::VaR(VarMethod::Parametric) => write!(f, "parametric VaR"),
      RiskMetric::VaR(VarMethod::Historical) => write!(f, "historical VaR"),
      RiskMetric::ExpectedShortfall => write!(f, "ES"),
      RiskMetric::CVaR => write!(f, "CVaR"),
    }
  }
}

/// One estimated risk figure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RiskEstimate {
  pub confidence: f64,
  pub metric: RiskMetric,
  pub value: f64,
}

impl fmt::Display for RiskEstimate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{:.1}% {}: {:.6}",
      self.confidence * 100.0,
      self.metric,
      self.value
    )
  }
}

/// All risk measures of one sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RiskReport {
  pub parametric_var: RiskEstimate,
  pub historical_var: RiskEstimate,
  pub expected_shortfall: RiskEstimate,
  pub cvar: RiskEstimate,
}

impl RiskReport {
  /// Estimates in reporting order.
  pub fn estimates(&self) -> [RiskEstimate; 4] {
    [
      self.parametric_var,
      self.historical_var,
      self.expected_shortfall,
      self.cvar,
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn estimate_display_names_metric_and_level() {
    let estimate = RiskEstimate {
      confidence: 0.975,
      metric: RiskMetric::ExpectedShortfall,
      value: -0.03,
    };
    assert_eq!(estimate.to_string(), "97.5% ES: -0.030000");
    assert_eq!(
      RiskMetric::VaR(VarMethod::Historical).to_string(),
      "historical VaR"
    );
  }
}
