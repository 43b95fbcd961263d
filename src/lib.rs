//! # commodity-risk
//!
//! $$
//! \text{prices}\to(\mu,\Sigma)\to\mathbf{w}^\*,\qquad
//! (V_0, C, \Sigma_V)\to R_p\to(\mathrm{VaR},\mathrm{ES},\mathrm{CVaR})
//! $$
//!
//! Portfolio optimization and Monte-Carlo risk measures for energy-commodity
//! books.

pub mod error;
pub mod quant;
pub mod stats;

pub use error::Result;
pub use error::RiskError;
pub use quant::portfolio::OptimizerConfig;
pub use quant::portfolio::PortfolioOptimizer;
pub use quant::risk::RiskEstimator;
pub use quant::simulation::CorrelatedReturnSimulator;
pub use quant::simulation::SimulationConfig;
pub use stats::ReturnStatistics;
