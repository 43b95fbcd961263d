//! # Market Value Sources
//!
//! $$
//! V_0^{(i)} = \operatorname{fetch}_i()
//! $$
//!
//! Current asset values come from injected sources, gathered before a
//! simulation is configured. The simulator and estimator never call out.

use crate::error::Result;
use crate::error::RiskError;

/// Narrow interface to anything that can quote an asset's current value.
pub trait MarketValueSource {
  fn fetch_current_value(&self) -> Result<f64>;
}

/// A source that always quotes the same value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedValue(pub f64);

impl MarketValueSource for FixedValue {
  fn fetch_current_value(&self) -> Result<f64> {
    Ok(self.0)
  }
}

impl<F> MarketValueSource for F
where
  F: Fn() -> Result<f64>,
{
  fn fetch_current_value(&self) -> Result<f64> {
    self()
  }
}

/// Quote every source once, in order. Non-positive or non-finite quotes are
/// rejected as [`RiskError::InvalidPrice`] naming the asset.
pub fn fetch_asset_values(sources: &[&dyn MarketValueSource]) -> Result<Vec<f64>> {
  sources
    .iter()
    .enumerate()
    .map(|(asset, source)| {
      let value = source.fetch_current_value()?;
      if value.is_finite() && value > 0.0 {
        Ok(value)
      } else {
        Err(RiskError::InvalidPrice {
          asset,
          index: 0,
          price: value,
        })
      }
    })
    .collect()
}
