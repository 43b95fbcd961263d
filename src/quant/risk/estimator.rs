//! # Risk Estimator
//!
//! $$
//! \mathrm{VaR}^{\text{par}}_\alpha=\bar x+s\,\Phi^{-1}(1-\alpha),\qquad
//! \mathrm{VaR}^{\text{hist}}_\alpha=q_{100(1-\alpha)}(x),\qquad
//! \mathrm{ES}_\alpha=\mathbb E\big[x \mid x\le \mathrm{VaR}^{\text{hist}}_\alpha\big]
//! $$
//!
//! $$
//! \mathrm{CVaR}_\alpha=\mathbb E\big[x \mid x\le q\big]+\tfrac12\,\mathbb E\big[x \mid x> q\big]
//! $$
//!
//! `s` is the population standard deviation. All values are signed lower-tail
//! thresholds, so `ES <= VaR` for the same sample and level.

use statrs::distribution::ContinuousCDF;
use statrs::distribution::Normal;
use tracing::debug;

use super::types::RiskEstimate;
use super::types::RiskMetric;
use super::types::RiskReport;
use super::types::VarMethod;
use crate::error::Result;
use crate::error::RiskError;
use crate::stats::descriptive::sorted;
use crate::stats::mean;
use crate::stats::percentile;
use crate::stats::population_std;

fn check_confidence(confidence: f64) -> Result<f64> {
  if confidence > 0.0 && confidence < 1.0 {
    Ok(confidence)
  } else {
    Err(RiskError::InvalidConfidenceLevel(confidence))
  }
}

fn check_samples(samples: &[f64]) -> Result<()> {
  if samples.is_empty() {
    return Err(RiskError::EmptySample);
  }
  if let Some(i) = samples.iter().position(|x| !x.is_finite()) {
    return Err(RiskError::InvalidParameter(format!(
      "sample {i} is not finite"
    )));
  }
  Ok(())
}

/// Lower-tail split of a sorted sample at its empirical quantile.
struct Tail {
  tail_mean: f64,
  rest_mean: f64,
}

impl Tail {
  fn of(samples: &[f64], confidence: f64) -> Self {
    let sorted = sorted(samples);
    let threshold = percentile(&sorted, 100.0 * (1.0 - confidence));
    let cut = sorted.partition_point(|&x| x <= threshold);
    Self {
      tail_mean: mean(&sorted[..cut]),
      rest_mean: mean(&sorted[cut..]),
    }
  }
}

/// Value-at-Risk, Expected Shortfall and CVaR at a fixed confidence level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RiskEstimator {
  confidence: f64,
}

impl RiskEstimator {
  /// `confidence` must lie in the open interval `(0, 1)`.
  pub fn new(confidence: f64) -> Result<Self> {
    Ok(Self {
      confidence: check_confidence(confidence)?,
    })
  }

  pub fn confidence(&self) -> f64 {
    self.confidence
  }

  fn estimate(&self, metric: RiskMetric, value: f64) -> RiskEstimate {
    RiskEstimate {
      confidence: self.confidence,
      metric,
      value,
    }
  }

  /// Normal-fit VaR from explicit moments.
  pub fn parametric_var_from_moments(&self, mean: f64, std: f64) -> Result<RiskEstimate> {
    if !mean.is_finite() || !std.is_finite() || std < 0.0 {
      return Err(RiskError::InvalidParameter(format!(
        "moments must be finite with std >= 0, got mean {mean} std {std}"
      )));
    }
    let normal = Normal::new(0.0, 1.0).map_err(|e| RiskError::InvalidParameter(e.to_string()))?;
    let z = normal.inverse_cdf(1.0 - self.confidence);
    Ok(self.estimate(RiskMetric::VaR(VarMethod::Parametric), mean + std * z))
  }

  /// Normal-fit VaR using the sample mean and population std.
  pub fn parametric_var(&self, samples: &[f64]) -> Result<RiskEstimate> {
    check_samples(samples)?;
    self.parametric_var_from_moments(mean(samples), population_std(samples))
  }

  /// Empirical `100 (1 - α)` percentile with linear interpolation.
  pub fn historical_var(&self, samples: &[f64]) -> Result<RiskEstimate> {
    check_samples(samples)?;
    let sorted = sorted(samples);
    let value = percentile(&sorted, 100.0 * (1.0 - self.confidence));
    Ok(self.estimate(RiskMetric::VaR(VarMethod::Historical), value))
  }

  /// Mean of every sample at or below the historical VaR.
  pub fn expected_shortfall(&self, samples: &[f64]) -> Result<RiskEstimate> {
    check_samples(samples)?;
    let tail = Tail::of(samples, self.confidence);
    Ok(self.estimate(RiskMetric::ExpectedShortfall, tail.tail_mean))
  }

  /// Tail mean plus half the mean of the samples above the threshold.
  ///
  /// When every sample sits in the tail the second term is zero.
  pub fn cvar(&self, samples: &[f64]) -> Result<RiskEstimate> {
    check_samples(samples)?;
    let tail = Tail::of(samples, self.confidence);
    Ok(self.estimate(RiskMetric::CVaR, tail.tail_mean + 0.5 * tail.rest_mean))
  }

  /// All four measures at this estimator's confidence level.
  pub fn report(&self, samples: &[f64]) -> Result<RiskReport> {
    self.report_with_tail(samples, self.confidence)
  }

  /// VaR at this estimator's level, ES and CVaR at `tail_confidence`.
  pub fn report_with_tail(&self, samples: &[f64], tail_confidence: f64) -> Result<RiskReport> {
    let tail_estimator = RiskEstimator::new(tail_confidence)?;
    let report = RiskReport {
      parametric_var: self.parametric_var(samples)?,
      historical_var: self.historical_var(samples)?,
      expected_shortfall: tail_estimator.expected_shortfall(samples)?,
      cvar: tail_estimator.cvar(samples)?,
    };

    debug!(
      samples = samples.len(),
      confidence = self.confidence,
      tail_confidence,
      var = report.historical_var.value,
      "risk report computed"
    );
    Ok(report)
  }
}
