//! # Risk
//!
//! $$
//! \mathrm{ES}_\alpha \le \mathrm{VaR}_\alpha
//! $$
//!
//! Coherent and non-coherent tail measures of simulated or historical
//! portfolio returns.

pub mod estimator;
pub mod types;

pub use estimator::RiskEstimator;
pub use types::RiskEstimate;
pub use types::RiskMetric;
pub use types::RiskReport;
pub use types::VarMethod;
